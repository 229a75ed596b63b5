//! egui rendering of the app state. Panels mutate selections; plots and
//! tables only read the current render model.

pub mod panels;
pub mod plot;
pub mod table;
