use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Estimate field unresolved: none of the configured candidates {candidates:?} exists on the issue")]
    EstimateFieldUnresolved { candidates: Vec<String> },

    #[error("Board not resolved: {0}")]
    BoardUnresolved(String),

    #[error("no data available: {0}")]
    EmptyDataset(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;
