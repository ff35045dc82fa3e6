//! Run orchestration
//!
//! Drives the full collection workflow for one source identifier: quota
//! gate, install pagination, eligibility filtering, rank resolution with
//! bounded retry, and append-only output.
//!
//! # Components
//!
//! - [`executor`] - Run executor with the pagination and resolution loop
//! - [`config`] - Page size, retry bound, and output path constants
//!
//! # Related modules
//!
//! - [`crate::fetcher`] - Installs and ranking API clients
//! - [`crate::output`] - Rank store writer and resume seeding
//! - [`crate::domain`] - Normalization and eligibility rules

pub mod config;
pub mod executor;

pub use executor::{RunExecutor, RunSummary, SourceRunStatus};

/// Collector errors
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] crate::fetcher::FetcherError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] crate::output::OutputError),
}

/// Result type for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;
