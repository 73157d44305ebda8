use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerSynthError {
    #[error("Invalid amount range for posting '{account}': low {low} must not exceed high {high}")]
    InvalidRange { account: String, low: f64, high: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid probability {0}: must be between 0.0 and 1.0")]
    InvalidProbability(f64),

    #[error("Invalid day of month {0}: must be between 1 and 31")]
    InvalidDayOfMonth(u32),

    #[error("Invalid day of week {0}: must be between 0 (Monday) and 6 (Sunday)")]
    InvalidDayOfWeek(u32),

    #[error("Date parse error: {0}")]
    DateError(String),

    #[error("Entry definition has an empty payee list")]
    EmptyPayee,

    #[error("Invalid generation range: start {start} is after end {end}")]
    InvalidGenerationRange { start: NaiveDate, end: NaiveDate },

    #[error("Report query failed: {0}")]
    QueryError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerSynthError>;
