//! Run executor: pagination, filtering, and rank resolution

use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::collector::config::{MAX_RANK_ATTEMPTS, PAGE_SIZE, RETRY_DELAY};
use crate::collector::CollectorResult;
use crate::domain::{is_eligible, normalize_domain};
use crate::fetcher::{FetcherResult, InstallsSource, PageResult, RankOutcome, RankingSource};
use crate::output::RankWriter;

/// Value written when the ranking source does not track a domain.
const NO_RANK: &str = "no rank";

/// Raw upstream code written when retries on a transient limit run out.
const TRANSIENT_LIMIT_CODE: &str = "429";

/// Terminal state of one source identifier's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRunStatus {
    /// The quota gate failed before any page was fetched.
    Skipped,
    /// Pagination ran to exhaustion.
    Done,
    /// The monthly ranking quota ran out mid-run.
    Aborted,
}

/// Counters reported back to the caller after a run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Terminal state the run reached
    pub status: SourceRunStatus,
    /// Number of install pages requested (including the final empty one)
    pub pages_fetched: u32,
    /// Number of rank rows appended to the store
    pub rows_written: u64,
}

/// Drives the collection workflow for source identifiers.
///
/// Holds the two API clients and the per-run exclusion rules; the output
/// writer and the existing-domain set are passed in per call so the caller
/// decides how they are seeded and when they are closed.
pub struct RunExecutor<I, R> {
    installs: I,
    ranking: R,
    excluded_suffixes: Vec<String>,
    page_size: usize,
}

impl<I, R> RunExecutor<I, R>
where
    I: InstallsSource,
    R: RankingSource,
{
    /// Create an executor with the default page size.
    pub fn new(installs: I, ranking: R, excluded_suffixes: Vec<String>) -> Self {
        Self {
            installs,
            ranking,
            excluded_suffixes,
            page_size: PAGE_SIZE,
        }
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Collect ranks for every install of one source identifier.
    ///
    /// Checks the remaining monthly quota first, then pages through the
    /// installs source. Each record's URL is normalized, filtered against
    /// `existing_domains` and the exclusion rules, resolved with bounded
    /// retry, and appended to `writer`. Domains are marked as seen only
    /// after their row has been written.
    ///
    /// # Errors
    /// Fails on undecodable responses from either source and on write
    /// failures. Quota exhaustion is not an error; it ends the run with
    /// [`SourceRunStatus::Aborted`].
    pub async fn run_source<W: RankWriter>(
        &self,
        plugin_id: &str,
        writer: &mut W,
        existing_domains: &mut HashSet<String>,
    ) -> CollectorResult<RunSummary> {
        let mut summary = RunSummary {
            status: SourceRunStatus::Done,
            pages_fetched: 0,
            rows_written: 0,
        };

        let remaining = self.ranking.remaining_requests().await?;
        if remaining <= 0 {
            info!(plugin_id, remaining, "monthly ranking API limit reached; skipping source");
            summary.status = SourceRunStatus::Skipped;
            return Ok(summary);
        }

        debug!(plugin_id, remaining, "ranking quota available; starting pagination");

        let mut offset = 0usize;
        loop {
            debug!(plugin_id, offset, "requesting installs page");

            let records = match self
                .installs
                .installs_page(plugin_id, self.page_size, offset)
                .await?
            {
                PageResult::Page(records) => records,
                PageResult::SourceUnavailable => {
                    debug!(plugin_id, offset, "installs source unavailable; stopping pagination");
                    break;
                }
            };

            // The offset advances after every request, whatever the page held.
            offset += self.page_size;
            summary.pages_fetched += 1;

            if records.is_empty() {
                debug!(plugin_id, "empty installs page; end of data");
                break;
            }

            for record in &records {
                let domain = normalize_domain(&record.url);

                if !is_eligible(&domain, &self.excluded_suffixes, existing_domains) {
                    continue;
                }

                let outcome = self.resolve_with_retry(&domain).await?;
                match outcome {
                    RankOutcome::Unauthorized => {
                        warn!(domain, "ranking request unauthorized; skipping domain");
                    }
                    RankOutcome::QuotaExhausted => {
                        warn!(plugin_id, domain, "monthly data point quota exhausted; aborting run");
                        summary.status = SourceRunStatus::Aborted;
                        return Ok(summary);
                    }
                    RankOutcome::NoRank => {
                        record_rank(writer, existing_domains, &domain, NO_RANK, &mut summary)?;
                    }
                    RankOutcome::Ranked(rank) => {
                        record_rank(
                            writer,
                            existing_domains,
                            &domain,
                            &rank.to_string(),
                            &mut summary,
                        )?;
                    }
                    // Retries exhausted on a persistent rate limit: the raw
                    // upstream code is written like any other result.
                    RankOutcome::TransientLimit => {
                        record_rank(
                            writer,
                            existing_domains,
                            &domain,
                            TRANSIENT_LIMIT_CODE,
                            &mut summary,
                        )?;
                    }
                }
            }
        }

        info!(
            plugin_id,
            pages = summary.pages_fetched,
            rows = summary.rows_written,
            "source pagination finished"
        );

        Ok(summary)
    }

    /// Resolve one domain's rank, retrying transient rate limits.
    ///
    /// At most [`MAX_RANK_ATTEMPTS`] lookups are made, sleeping
    /// [`RETRY_DELAY`] between attempts. Any outcome other than
    /// [`RankOutcome::TransientLimit`] ends the loop immediately; if every
    /// attempt is rate limited, the last outcome is returned as-is.
    async fn resolve_with_retry(&self, domain: &str) -> FetcherResult<RankOutcome> {
        let mut outcome = self.ranking.rank_for_domain(domain).await?;
        let mut attempt = 1;

        while outcome == RankOutcome::TransientLimit && attempt < MAX_RANK_ATTEMPTS {
            debug!(domain, attempt, "rank lookup rate limited; retrying");
            sleep(RETRY_DELAY).await;
            outcome = self.ranking.rank_for_domain(domain).await?;
            attempt += 1;
        }

        Ok(outcome)
    }
}

/// Append one resolved rank and mark the domain as seen.
fn record_rank<W: RankWriter>(
    writer: &mut W,
    existing_domains: &mut HashSet<String>,
    domain: &str,
    value: &str,
    summary: &mut RunSummary,
) -> CollectorResult<()> {
    writer.append(domain, value)?;
    existing_domains.insert(domain.to_string());
    summary.rows_written += 1;
    debug!(domain, value, "recorded rank");
    Ok(())
}
