use thiserror::Error;

#[derive(Error, Debug)]
pub enum DailyTopError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Listing parse error: {0}")]
    ListingParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed item at position {position}: {reason}")]
    MalformedItem { position: usize, reason: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Failure classes driving how a poll cycle reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Upstream fetch or listing failure; the cycle is skipped.
    Fetch,
    /// A single bad item; the item is skipped and the batch continues.
    Merge,
    /// Read/write failure; the cycle is aborted without partial commit.
    Storage,
    /// Export or publish failure; logged, the marker still advances.
    Export,
    Other,
}

impl DailyTopError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::ListingParse(_) | Self::InvalidUrl(_) => ErrorCategory::Fetch,
            Self::MalformedItem { .. } => ErrorCategory::Merge,
            Self::Database(_) | Self::Encoding(_) | Self::Storage(_) => ErrorCategory::Storage,
            Self::Export(_) | Self::Publish(_) => ErrorCategory::Export,
            Self::Io(_) | Self::Config(_) | Self::Other(_) => ErrorCategory::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DailyTopError>;
