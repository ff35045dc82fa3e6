//! SimilarWeb ranking API client
//!
//! Maps the API's status codes onto [`RankOutcome`]:
//! 200 → `Ranked`, 404 → `NoRank`, 429 → `TransientLimit`,
//! 401 → `Unauthorized`, 403 → `QuotaExhausted` (monthly data points spent).
//! Any other status is an error and terminates the run.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{FetcherError, FetcherResult, RankOutcome, RankingSource};

const DEFAULT_BASE_URL: &str = "https://api.similarweb.com";

/// Client for the SimilarWeb similar-rank API.
pub struct SimilarWebClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SimilarWebClient {
    /// Create a client against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client with a custom base URL (for testing).
    pub fn new_with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Response body of a successful rank lookup.
#[derive(Debug, Deserialize)]
struct RankResponse {
    similar_rank: SimilarRank,
}

#[derive(Debug, Deserialize)]
struct SimilarRank {
    rank: u64,
}

/// Response body of the user-capabilities endpoint.
#[derive(Debug, Deserialize)]
struct UserCapabilities {
    user_remaining: i64,
}

#[async_trait]
impl RankingSource for SimilarWebClient {
    async fn rank_for_domain(&self, domain: &str) -> FetcherResult<RankOutcome> {
        let url = format!("{}/v1/similar-rank/{}/rank", self.base_url, domain);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("rank request failed: {e}")))?;

        let status = response.status();
        match status.as_u16() {
            401 => return Ok(RankOutcome::Unauthorized),
            403 => return Ok(RankOutcome::QuotaExhausted),
            404 => return Ok(RankOutcome::NoRank),
            429 => return Ok(RankOutcome::TransientLimit),
            _ => {}
        }

        if !status.is_success() {
            return Err(FetcherError::HttpError(format!(
                "unexpected status {status} for rank lookup of {domain}"
            )));
        }

        let body: RankResponse = response.json().await.map_err(|e| {
            FetcherError::ParseError(format!("failed to deserialize rank response: {e}"))
        })?;

        debug!(domain, rank = body.similar_rank.rank, "rank lookup succeeded");

        Ok(RankOutcome::Ranked(body.similar_rank.rank))
    }

    async fn remaining_requests(&self) -> FetcherResult<i64> {
        let url = format!("{}/user-capabilities", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("capabilities request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetcherError::HttpError(format!(
                "unexpected status {status} for capabilities query"
            )));
        }

        let body: UserCapabilities = response.json().await.map_err(|e| {
            FetcherError::ParseError(format!("failed to deserialize capabilities response: {e}"))
        })?;

        debug!(remaining = body.user_remaining, "queried remaining monthly requests");

        Ok(body.user_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SimilarWebClient {
        SimilarWebClient::new_with_base_url(server.uri(), "test-key")
    }

    async fn mount_rank_status(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/v1/similar-rank/example.com/rank"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_ranked_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/similar-rank/example.com/rank"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"status": "Success"},
                "similar_rank": {"rank": 4321}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let outcome = client.rank_for_domain("example.com").await.unwrap();
        assert_eq!(outcome, RankOutcome::Ranked(4321));
    }

    #[tokio::test]
    async fn test_not_found_is_no_rank() {
        let server = MockServer::start().await;
        mount_rank_status(&server, 404).await;

        let client = client_for(&server);
        let outcome = client.rank_for_domain("example.com").await.unwrap();
        assert_eq!(outcome, RankOutcome::NoRank);
    }

    #[tokio::test]
    async fn test_rate_limit_is_transient() {
        let server = MockServer::start().await;
        mount_rank_status(&server, 429).await;

        let client = client_for(&server);
        let outcome = client.rank_for_domain("example.com").await.unwrap();
        assert_eq!(outcome, RankOutcome::TransientLimit);
    }

    #[tokio::test]
    async fn test_unauthorized_and_quota_statuses() {
        let server = MockServer::start().await;
        mount_rank_status(&server, 401).await;
        let client = client_for(&server);
        assert_eq!(
            client.rank_for_domain("example.com").await.unwrap(),
            RankOutcome::Unauthorized
        );

        let server = MockServer::start().await;
        mount_rank_status(&server, 403).await;
        let client = client_for(&server);
        assert_eq!(
            client.rank_for_domain("example.com").await.unwrap(),
            RankOutcome::QuotaExhausted
        );
    }

    #[tokio::test]
    async fn test_server_error_is_fatal() {
        let server = MockServer::start().await;
        mount_rank_status(&server, 500).await;

        let client = client_for(&server);
        let result = client.rank_for_domain("example.com").await;
        assert!(matches!(result, Err(FetcherError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_remaining_requests_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user-capabilities"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user_remaining": 250
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.remaining_requests().await.unwrap(), 250);
    }

    #[tokio::test]
    async fn test_remaining_requests_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user-capabilities"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.remaining_requests().await,
            Err(FetcherError::HttpError(_))
        ));
    }
}
