// Error types for the sync pipeline

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Fatal errors that abort a run.
///
/// Per-record problems (a value that fails coercion, a row with an
/// unparseable date, a single failed write) are not represented here;
/// they degrade to an absent value or a skipped record and the run
/// continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A read query against the broker returned a non-2xx status
    #[error("Error {status}: {body}")]
    Query { status: u16, body: String },

    /// Transport-level HTTP failure on a read path
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The CSV source could not be fetched
    #[error("CSV download failed with status {status}: {body}")]
    CsvFetch { status: u16, body: String },

    /// The CSV body could not be parsed
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

impl SyncError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        SyncError::Config(msg.into())
    }
}
