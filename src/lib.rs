//! # Install Rank Downloader Library
//!
//! Collects web ranks for every website running a set of plugins. Installs
//! are paged from the Freemius API, each install's URL is reduced to a bare
//! domain, and eligible domains are looked up against the SimilarWeb
//! similar-rank API. Results land in an append-only CSV that doubles as the
//! dedup seed on the next run, so interrupted runs pick up where they left
//! off without re-spending ranking quota.
//!
//! ## Quick Start
//!
//! ```no_run
//! use install_rank_downloader::collector::RunExecutor;
//! use install_rank_downloader::fetcher::freemius::FreemiusClient;
//! use install_rank_downloader::fetcher::similarweb::SimilarWebClient;
//! use install_rank_downloader::output::csv::{read_existing_domains, CsvRankWriter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let installs = FreemiusClient::new("fs-api-token");
//! let ranking = SimilarWebClient::new("similarweb-api-key");
//! let executor = RunExecutor::new(installs, ranking, vec![".dev".to_string()]);
//!
//! let mut existing = read_existing_domains("output/ranks.csv")?;
//! let mut writer = CsvRankWriter::open_append("output/ranks.csv")?;
//! let summary = executor.run_source("1234", &mut writer, &mut existing).await?;
//! println!("wrote {} rows", summary.rows_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`domain`] - URL normalization and ranking eligibility rules
//! - [`fetcher`] - Installs and ranking API clients behind small traits
//! - [`collector`] - Run orchestration: quota gate, pagination, retry
//! - [`output`] - Append-only CSV rank store and resume seeding
//! - [`cli`] - Command-line interface and configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Run orchestration
pub mod collector;

/// Domain normalization and eligibility
pub mod domain;

/// API clients for the installs and ranking services
pub mod fetcher;

/// Rank output writers
pub mod output;

pub use fetcher::RankOutcome;
