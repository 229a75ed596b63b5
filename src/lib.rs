//! Technology usage, sleep and health analytics.
//!
//! A tabular dataset is loaded once, cleaned once, then filtered and
//! summarised on every interaction:
//! source → [`data::loader`] → [`data::clean`] → [`data::filter`] →
//! [`data::aggregate`] → [`view::RenderModel`].
//!
//! The desktop dashboard and the `report` command are thin shells over
//! [`view::build`].

pub mod config;
pub mod data;
pub mod view;

pub use config::DashboardConfig;
pub use data::cache::{DataSource, SessionCache};
pub use data::filter::{FilterCriteria, FilterOptions};
pub use data::model::{AddictionLevel, Dataset, Record, Value};
pub use view::{RenderModel, ViewSelection};
