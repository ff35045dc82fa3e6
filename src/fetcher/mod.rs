//! Clients for the installs and ranking services

use async_trait::async_trait;
use serde::Deserialize;

pub mod freemius;
pub mod similarweb;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response parse error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// One recorded activation of the product, carrying the site URL.
///
/// The installs API returns many more fields per install; only the URL is
/// consumed, so everything else is ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallRecord {
    /// Site URL as reported by the install
    pub url: String,
}

/// One page of install records, or the source signalling the end of data.
#[derive(Debug)]
pub enum PageResult {
    /// A decoded page of install records (possibly empty)
    Page(Vec<InstallRecord>),
    /// Transport failure or non-success response; pagination stops here
    SourceUnavailable,
}

/// Final outcome of a single rank lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOutcome {
    /// Numeric global rank for the domain
    Ranked(u64),
    /// The ranking source does not track this domain
    NoRank,
    /// Per-call rate limit hit; the lookup may be retried
    TransientLimit,
    /// Credential or authorization failure for this lookup
    Unauthorized,
    /// The account-level monthly quota is exhausted
    QuotaExhausted,
}

/// Paginated source of install records.
#[async_trait]
pub trait InstallsSource: Send + Sync {
    /// Fetch one page of installs for a plugin.
    ///
    /// # Arguments
    /// * `plugin_id` - Plugin identifier to page through
    /// * `count` - Page size
    /// * `offset` - Zero-based record offset
    ///
    /// # Errors
    /// Returns an error only when a successful response cannot be decoded.
    /// Transport failures and non-success statuses are reported as
    /// [`PageResult::SourceUnavailable`].
    async fn installs_page(
        &self,
        plugin_id: &str,
        count: usize,
        offset: usize,
    ) -> FetcherResult<PageResult>;
}

/// Web-ranking source with an account-level monthly quota.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Look up the rank for one domain.
    ///
    /// The distinguished upstream conditions (no rank, rate limit,
    /// authorization failure, quota exhaustion) are reported as
    /// [`RankOutcome`] values, not errors; only unexpected responses fail.
    async fn rank_for_domain(&self, domain: &str) -> FetcherResult<RankOutcome>;

    /// Query how many monthly lookup calls remain on the account.
    async fn remaining_requests(&self) -> FetcherResult<i64>;
}
