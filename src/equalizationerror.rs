use thiserror::Error;

#[derive(Error, Debug)]
pub enum EqualizationError {
    #[error("field {field} has a degenerate range (min == max == {value})")]
    DegenerateRange { field: usize, value: f64 },

    #[error("precision violation: {what} = {value}")]
    PrecisionViolation { what: &'static str, value: f64 },

    #[error("no convergence after {iterations} iterations (bracket [{k1}, {k2}])")]
    ConvergenceFailure { iterations: usize, k1: f64, k2: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("insufficient data: {rows} row(s), at least 2 required")]
    InsufficientData { rows: usize },

    #[error("row {row} field {field} holds a non-finite value ({value})")]
    NonFiniteValue { row: usize, field: usize, value: f64 },

    #[error("duplicate row key '{0}'")]
    DuplicateRowKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EqualizationError {
    pub fn precision_violation(what: &'static str, value: f64) -> EqualizationError {
        EqualizationError::PrecisionViolation { what, value }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> EqualizationError {
        EqualizationError::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EqualizationError>;
