use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvWaterfallError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl EvWaterfallError {
    /// Shorthand for the validation errors raised while building a config.
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EvWaterfallError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EvWaterfallError {
    fn from(e: serde_json::Error) -> Self {
        EvWaterfallError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for EvWaterfallError {
    fn from(e: csv::Error) -> Self {
        EvWaterfallError::Export(e.to_string())
    }
}

impl From<std::io::Error> for EvWaterfallError {
    fn from(e: std::io::Error) -> Self {
        EvWaterfallError::Export(e.to_string())
    }
}
