use thiserror::Error;

/// Non-fatal reasons an aggregation cannot produce a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("field not present in dataset: {0}")]
    MissingField(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),
}
