//! Freemius installs API client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{FetcherError, FetcherResult, InstallRecord, InstallsSource, PageResult};

const DEFAULT_BASE_URL: &str = "https://api.freemius.com";

/// Client for the Freemius installs API.
///
/// Pages through `/v1/plugins/{id}/installs.json` with `count`/`offset`
/// parameters. Any transport failure or non-success response is treated as
/// the end of data rather than an error, so a revoked token or a deleted
/// plugin simply stops pagination.
pub struct FreemiusClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl FreemiusClient {
    /// Create a client against the production API.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL, api_token)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn new_with_base_url(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }
}

/// Envelope around the `installs` array in an API response page.
#[derive(Debug, Deserialize)]
struct InstallsPage {
    installs: Vec<InstallRecord>,
}

#[async_trait]
impl InstallsSource for FreemiusClient {
    async fn installs_page(
        &self,
        plugin_id: &str,
        count: usize,
        offset: usize,
    ) -> FetcherResult<PageResult> {
        let url = format!("{}/v1/plugins/{}/installs.json", self.base_url, plugin_id);

        debug!(plugin_id, count, offset, "requesting installs page");

        let response = match self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("count", count.to_string()), ("offset", offset.to_string())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(plugin_id, offset, error = %e, "installs request failed");
                return Ok(PageResult::SourceUnavailable);
            }
        };

        if !response.status().is_success() {
            debug!(
                plugin_id,
                offset,
                status = %response.status(),
                "installs source returned non-success status"
            );
            return Ok(PageResult::SourceUnavailable);
        }

        let page: InstallsPage = response.json().await.map_err(|e| {
            FetcherError::ParseError(format!("failed to deserialize installs page: {e}"))
        })?;

        debug!(plugin_id, offset, records = page.installs.len(), "received installs page");

        Ok(PageResult::Page(page.installs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FreemiusClient {
        FreemiusClient::new_with_base_url(server.uri(), "test-token")
    }

    #[tokio::test]
    async fn test_page_with_installs_deserializes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plugins/1234/installs.json"))
            .and(query_param("count", "50"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "installs": [
                    {"id": "1", "url": "https://a.com/", "version": "2.0.1"},
                    {"id": "2", "url": "http://b.org", "version": "2.0.0"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.installs_page("1234", 50, 0).await.unwrap() {
            PageResult::Page(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].url, "https://a.com/");
                assert_eq!(records[1].url, "http://b.org");
            }
            PageResult::SourceUnavailable => panic!("expected a page"),
        }
    }

    #[tokio::test]
    async fn test_empty_page_deserializes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plugins/1234/installs.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"installs": []})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.installs_page("1234", 50, 100).await.unwrap() {
            PageResult::Page(records) => assert!(records.is_empty()),
            PageResult::SourceUnavailable => panic!("expected an empty page"),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plugins/1234/installs.json"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.installs_page("1234", 50, 0).await.unwrap(),
            PageResult::SourceUnavailable
        ));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_source_unavailable() {
        // Port 1 is never listening; the request fails at the transport level.
        let client = FreemiusClient::new_with_base_url("http://127.0.0.1:1", "test-token");
        assert!(matches!(
            client.installs_page("1234", 50, 0).await.unwrap(),
            PageResult::SourceUnavailable
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plugins/1234/installs.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.installs_page("1234", 50, 0).await;
        assert!(matches!(result, Err(FetcherError::ParseError(_))));
    }
}
