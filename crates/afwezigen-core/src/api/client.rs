//! API client for the sports-data injuries and fixtures endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{FixtureEntry, FixturesResponse, InjuriesPayload};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";

/// API client for the injuries source.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    injuries_url: String,
    fixtures_url: String,
    league: Option<u32>,
    season: Option<u32>,
    api_key: Option<String>,
    api_host: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            injuries_url: config.injuries_url.clone(),
            fixtures_url: config.fixtures_url.clone(),
            league: config.league,
            season: config.season,
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        })
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.api_key {
            headers.insert(API_KEY_HEADER, header::HeaderValue::from_str(key)?);
        }
        if let Some(ref host) = self.api_host {
            headers.insert(API_HOST_HEADER, header::HeaderValue::from_str(host)?);
        }
        Ok(headers)
    }

    fn injuries_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(league) = self.league {
            query.push(("league", league.to_string()));
        }
        if let Some(season) = self.season {
            query.push(("season", season.to_string()));
        }
        query
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// GET `url` and parse the body as JSON, backing off on 429.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(self.auth_headers()?)
                .query(query)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response
                        .text()
                        .await
                        .map_err(ApiError::from)
                        .with_context(|| format!("Failed to read response body from {}", url))?;
                    debug!(url = url, bytes = text.len(), "Response received");
                    return serde_json::from_str(&text)
                        .map_err(|e| ApiError::MalformedResponse(format!("body is not JSON: {}", e)).into());
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch the injuries list for the configured league and season
    pub async fn fetch_injuries(&self) -> Result<InjuriesPayload> {
        let value = self.get_json(&self.injuries_url, &self.injuries_query()).await?;
        let payload = InjuriesPayload::from_value(value)?;
        debug!(records = payload.response.len(), "Parsed injuries response");
        Ok(payload)
    }

    /// Fetch the upcoming fixtures of a team and return the first one
    pub async fn fetch_next_fixture(&self, team_id: i64, count: u32) -> Result<Option<FixtureEntry>> {
        let query = [("team", team_id.to_string()), ("next", count.max(1).to_string())];
        let value = self
            .get_json(&self.fixtures_url, &query)
            .await
            .with_context(|| format!("Failed to fetch next fixture for team {}", team_id))?;
        let parsed: FixturesResponse = serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("unexpected fixtures shape: {}", e)))?;
        Ok(parsed.into_first())
    }
}
