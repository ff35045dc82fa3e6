//! Rank output writers

pub mod csv;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only record of resolved domain ranks.
pub trait RankWriter {
    /// Append one `domain,value` row.
    fn append(&mut self, domain: &str, value: &str) -> OutputResult<()>;

    /// Flush any buffered rows to disk.
    fn flush(&mut self) -> OutputResult<()>;
}
