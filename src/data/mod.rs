/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (path or upload)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → raw Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  coerce / clamp, drop incomplete rows   (once, cached)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → filtered Dataset       (every interaction)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  level means, quartile bins, correlation, trends
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
