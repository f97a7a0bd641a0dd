use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("No input provided: {0}")]
    MissingInput(String),

    #[error("Invalid month {month} for year {year}: must be between 1 and 12")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Date calculation error: {0}")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid revenue adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("Revenue adjustment not found: {0}")]
    AdjustmentNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
