//! Run command: collect web ranks for all installs of the configured plugins

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::collector::config::{OUTPUT_DIR, OUTPUT_FILE};
use crate::collector::{RunExecutor, SourceRunStatus};
use crate::fetcher::freemius::FreemiusClient;
use crate::fetcher::similarweb::SimilarWebClient;
use crate::output::csv::{read_existing_domains, CsvRankWriter};

use super::CliError;

/// Install rank downloader CLI
#[derive(Parser, Debug)]
#[command(name = "install-rank-downloader")]
#[command(about = "Collect web ranks for every site running the configured plugins", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Plugin identifiers to process, in order (comma-separated)
    #[arg(long, env = "FS_API_PLUGIN_ID", value_delimiter = ',', required = true)]
    pub plugin_ids: Vec<String>,

    /// Domain suffixes excluded from ranking (comma-separated, e.g. ".dev,.mysite.com")
    #[arg(long, env = "EXCLUDED_DOMAIN_SUFFIXES", value_delimiter = ',')]
    pub excluded_suffixes: Vec<String>,

    /// Freemius API bearer token
    #[arg(long, env = "FS_API_TOKEN", hide_env_values = true)]
    pub fs_api_token: String,

    /// SimilarWeb API key
    #[arg(long, env = "SIMILARWEB_API_KEY", hide_env_values = true)]
    pub similarweb_api_key: String,

    /// Directory the rank store is written to
    #[arg(long, default_value = OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Override the installs API base URL
    #[arg(long, hide = true)]
    pub freemius_base_url: Option<String>,

    /// Override the ranking API base URL
    #[arg(long, hide = true)]
    pub similarweb_base_url: Option<String>,
}

impl Cli {
    /// Process every configured plugin identifier in order.
    ///
    /// The rank store is re-read and re-opened for each identifier, so every
    /// run seeds its dedup set from all rows written so far, including rows
    /// appended for earlier identifiers in the same invocation.
    pub async fn execute(&self) -> Result<(), CliError> {
        if self.plugin_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(CliError::InvalidArgument(
                "plugin identifier list contains an empty entry".to_string(),
            ));
        }

        let installs = match &self.freemius_base_url {
            Some(base_url) => FreemiusClient::new_with_base_url(base_url, &self.fs_api_token),
            None => FreemiusClient::new(&self.fs_api_token),
        };
        let ranking = match &self.similarweb_base_url {
            Some(base_url) => SimilarWebClient::new_with_base_url(base_url, &self.similarweb_api_key),
            None => SimilarWebClient::new(&self.similarweb_api_key),
        };

        let executor = RunExecutor::new(installs, ranking, self.excluded_suffixes.clone());
        let output_path = self.output_dir.join(OUTPUT_FILE);

        info!(
            plugins = self.plugin_ids.len(),
            excluded_suffixes = ?self.excluded_suffixes,
            output = %output_path.display(),
            "starting rank collection"
        );

        for plugin_id in &self.plugin_ids {
            info!(plugin_id, "processing plugin");

            let mut existing_domains = read_existing_domains(&output_path)?;
            let mut writer = CsvRankWriter::open_append(&output_path)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("ranking installs of plugin {plugin_id}"));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let summary = executor
                .run_source(plugin_id, &mut writer, &mut existing_domains)
                .await;

            spinner.finish_and_clear();

            let summary = summary?;
            writer.close()?;

            match summary.status {
                SourceRunStatus::Skipped => {
                    info!(plugin_id, "skipped: monthly ranking API limit reached");
                }
                SourceRunStatus::Done => {
                    info!(
                        plugin_id,
                        pages = summary.pages_fetched,
                        rows = summary.rows_written,
                        "finished"
                    );
                }
                SourceRunStatus::Aborted => {
                    info!(
                        plugin_id,
                        rows = summary.rows_written,
                        "aborted: monthly data point quota exhausted"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "install-rank-downloader",
            "--fs-api-token",
            "token",
            "--similarweb-api-key",
            "key",
        ]
    }

    #[test]
    fn test_plugin_ids_split_on_commas() {
        let mut args = base_args();
        args.extend(["--plugin-ids", "111,222,333"]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.plugin_ids, vec!["111", "222", "333"]);
    }

    #[test]
    fn test_excluded_suffixes_default_empty() {
        let mut args = base_args();
        args.extend(["--plugin-ids", "111"]);
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.excluded_suffixes.is_empty());
        assert_eq!(cli.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_plugin_ids_are_required() {
        let result = Cli::try_parse_from(base_args());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_plugin_id_entry_rejected() {
        let mut args = base_args();
        args.extend(["--plugin-ids", "111,,222"]);
        let cli = Cli::try_parse_from(args).unwrap();
        let result = cli.execute().await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
