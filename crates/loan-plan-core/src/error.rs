use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanPlanError {
    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanPlanError {
    /// Structural violation attributed to a phase (1-based in the message).
    pub fn malformed_phase(index: usize, reason: impl std::fmt::Display) -> Self {
        LoanPlanError::MalformedSchedule(format!("phase {}: {}", index + 1, reason))
    }
}

impl From<serde_json::Error> for LoanPlanError {
    fn from(e: serde_json::Error) -> Self {
        LoanPlanError::SerializationError(e.to_string())
    }
}
