//! Comic Vine API client with per-endpoint quota tracking.

use super::rate_tracker::{Endpoint, RateTracker};
use super::types::*;
use crate::error::{ComicVineError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::config::ComicVineConfig;
use tracing::{debug, info, warn};

/// Comic Vine API client
pub struct ComicVineClient {
    /// HTTP client
    client: Client,
    /// Base URL for the Comic Vine API
    base_url: String,
    api_key: String,
    /// Items requested per issue list page
    page_size: u32,
    rate_tracker: RateTracker,
}

impl ComicVineClient {
    /// Create a new client from the `[comicvine]` config section
    pub fn new(api_key: String, config: &ComicVineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            page_size: config.page_size,
            rate_tracker: RateTracker::new(
                config.rate_limit.requests_per_window,
                config.rate_limit.window(),
            ),
        })
    }

    /// Make a GET request to `endpoint`, counting it against that endpoint's quota
    async fn get<T: DeserializeOwned>(
        &mut self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.base_url, path);

        self.rate_tracker.authorize(endpoint).await;
        debug!(url = %url, params = ?params, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Request failed");
            return Err(ComicVineError::RemoteRequestFailed { endpoint, status });
        }

        // Error bodies carry `results: []` regardless of endpoint, so check the
        // status code before decoding `results` into T.
        let body = response.bytes().await?;
        let envelope: Envelope<Value> = serde_json::from_slice(&body)?;

        if envelope.status_code != STATUS_OK {
            warn!(
                url = %url,
                code = envelope.status_code,
                error = %envelope.error,
                "API reported an error"
            );
            return Err(ComicVineError::Api {
                code: envelope.status_code,
                message: envelope.error,
            });
        }

        Ok(Envelope {
            status_code: envelope.status_code,
            error: envelope.error,
            number_of_total_results: envelope.number_of_total_results,
            number_of_page_results: envelope.number_of_page_results,
            results: serde_json::from_value(envelope.results)?,
        })
    }

    /// Find the best-matching volume for a series name
    pub async fn search_volume(&mut self, query: &str) -> Result<VolumeSummary> {
        info!(query = %query, "Searching for volume");
        let params = [
            ("query", query.to_string()),
            ("resources", "volume".to_string()),
            ("field_list", "id,name".to_string()),
            ("limit", "1".to_string()),
        ];

        let response: Envelope<Vec<VolumeSummary>> =
            self.get(Endpoint::Search, "/search/", &params).await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ComicVineError::VolumeNotFound(query.to_string()))
    }

    /// Fetch name and publisher of a volume
    pub async fn fetch_volume_details(&mut self, volume_id: u32) -> Result<VolumeDetails> {
        info!(volume_id = volume_id, "Fetching volume details");
        let params = [("field_list", "name,publisher".to_string())];
        let response: Envelope<VolumeDetails> = self
            .get(Endpoint::Volume, &format!("/volume/4050-{}/", volume_id), &params)
            .await?;
        Ok(response.results)
    }

    /// Fetch one page of issue IDs for a volume
    pub async fn fetch_issue_page(&mut self, volume_id: u32, offset: u32) -> Result<PageResult> {
        let params = [
            ("filter", format!("volume:{}", volume_id)),
            ("field_list", "id".to_string()),
            ("limit", self.page_size.to_string()),
            ("offset", offset.to_string()),
        ];
        let response: Envelope<Vec<IssueSummary>> =
            self.get(Endpoint::Issues, "/issues/", &params).await?;
        Ok(PageResult::try_from(response)?)
    }

    /// Fetch every issue of a volume, walking pages until the declared total
    /// is reached
    ///
    /// Pages are requested in increasing offset order and the result keeps the
    /// server's order. Any failed page fails the whole call.
    pub async fn fetch_all_issues(&mut self, volume_id: u32) -> Result<Vec<IssueSummary>> {
        let mut issues = Vec::new();
        let mut offset = 0;
        // Unknown until the first page arrives
        let mut total = 1;

        while offset < total {
            let page = self.fetch_issue_page(volume_id, offset).await?;
            total = page.total_results;

            if page.page_results_count == 0 && page.results.is_empty() {
                if offset < total {
                    warn!(
                        volume_id = volume_id,
                        offset = offset,
                        total = total,
                        "Empty page before reaching declared total, stopping"
                    );
                }
                break;
            }

            // A zero count alongside real results is a server inconsistency;
            // advance by what actually arrived
            offset += if page.page_results_count == 0 {
                page.results.len() as u32
            } else {
                page.page_results_count
            };
            issues.extend(page.results);

            info!(
                volume_id = volume_id,
                progress = format!("{}/{}", issues.len(), total),
                "Fetched issue page"
            );
        }

        Ok(issues)
    }

    /// Fetch full details of one issue
    pub async fn fetch_issue_details(&mut self, issue_id: u32) -> Result<IssueDetails> {
        debug!(issue_id = issue_id, "Fetching issue details");
        let response: Envelope<IssueDetails> = self
            .get(Endpoint::Issue, &format!("/issue/4000-{}/", issue_id), &[])
            .await?;
        Ok(response.results)
    }

    /// Quota state, for reporting
    pub fn rate_tracker(&self) -> &RateTracker {
        &self.rate_tracker
    }
}
