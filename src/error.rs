use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("At least one reporting period is required to build a statement tree")]
    EmptyPeriods,

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("No node found at path '{0}'")]
    UnknownPath(String),

    #[error("Path '{0}' points to a category, not a line item")]
    NotALineItem(String),

    #[error("Path '{0}' points to a line item, not a category")]
    NotACategory(String),

    #[error("Line item '{0}' is not keyed by exactly the tracked periods")]
    PeriodKeyMismatch(String),

    #[error("Reporting period {0} is not tracked by this statement")]
    UntrackedPeriod(String),

    #[error("Invalid value {value} for '{path}': values must be finite")]
    InvalidValue { path: String, value: f64 },

    #[error("Invalid fiscal year end month {0}: must be between 1 and 12")]
    InvalidFiscalYearEndMonth(u32),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatementError>;
