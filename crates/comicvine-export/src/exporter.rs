//! Series export orchestrator.
//!
//! Coordinates the whole export: find the volume, look up its publisher,
//! list every issue, then fetch each issue's details and write it as a CSV row.

use crate::api::{ComicVineClient, IssueDetails};
use crate::csv_output::{IssueRow, IssueWriter, NOT_AVAILABLE};
use crate::error::ComicVineError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Statistics for an export run
#[derive(Debug, Clone)]
pub struct ExportStats {
    pub volume_id: u32,
    pub volume_name: String,
    pub publisher: String,
    pub issues_listed: usize,
    pub rows_written: usize,
    pub throttle_waits: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Main export coordinator
pub struct SeriesExporter {
    client: ComicVineClient,
    /// Pause after each issue detail fetch
    request_delay: Duration,
    /// Blanket wait after the server signals throttling
    throttle_wait: Duration,
}

impl SeriesExporter {
    pub fn new(client: ComicVineClient, request_delay: Duration, throttle_wait: Duration) -> Self {
        Self {
            client,
            request_delay,
            throttle_wait,
        }
    }

    /// Run the complete export for `series_query`, writing CSV to `output`
    pub async fn run(&mut self, series_query: &str, output: &Path) -> Result<ExportStats> {
        let started_at = Utc::now();

        let volume = self
            .client
            .search_volume(series_query)
            .await
            .context("Failed to search for series")?;
        info!(volume_id = volume.id, name = %volume.name, "Found series");

        let details = self
            .client
            .fetch_volume_details(volume.id)
            .await
            .context("Failed to fetch volume details")?;
        let publisher = details.publisher_name().unwrap_or(NOT_AVAILABLE).to_string();
        info!(volume_id = volume.id, publisher = %publisher, "Volume details fetched");

        let issues = self
            .client
            .fetch_all_issues(volume.id)
            .await
            .with_context(|| format!("Failed to list issues for volume {}", volume.id))?;

        let mut writer = IssueWriter::create(output)?;
        let mut throttle_waits = 0;

        for (idx, summary) in issues.iter().enumerate() {
            let (issue, waits) = self.fetch_issue_with_throttle_retry(summary.id).await?;
            throttle_waits += waits;

            info!(
                progress = format!("{}/{}", idx + 1, issues.len()),
                issue_id = summary.id,
                name = issue.name.as_deref().unwrap_or_default(),
                "Fetched issue details"
            );

            writer.write_row(&IssueRow::from_details(&issue, &publisher))?;

            if !self.request_delay.is_zero() {
                sleep(self.request_delay).await;
            }
        }

        let rows_written = writer.rows_written();
        writer.finish()?;

        let stats = ExportStats {
            volume_id: volume.id,
            volume_name: volume.name,
            publisher,
            issues_listed: issues.len(),
            rows_written,
            throttle_waits,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            output = %output.display(),
            rows = stats.rows_written,
            throttle_waits = stats.throttle_waits,
            elapsed_secs = (stats.finished_at - stats.started_at).num_seconds(),
            "Export complete"
        );

        Ok(stats)
    }

    /// Fetch one issue; on throttling wait out the penalty and try once more
    ///
    /// Returns the details and the number of throttle waits taken.
    async fn fetch_issue_with_throttle_retry(
        &mut self,
        issue_id: u32,
    ) -> Result<(IssueDetails, usize)> {
        match self.client.fetch_issue_details(issue_id).await {
            Ok(issue) => Ok((issue, 0)),
            Err(e) if e.is_rate_limited() => {
                warn!(
                    issue_id = issue_id,
                    error = %e,
                    wait_secs = self.throttle_wait.as_secs(),
                    "Rate limit hit, sleeping before retry"
                );
                sleep(self.throttle_wait).await;

                let issue = self
                    .client
                    .fetch_issue_details(issue_id)
                    .await
                    .map_err(|e| Self::issue_error(issue_id, e))?;
                Ok((issue, 1))
            }
            Err(e) => Err(Self::issue_error(issue_id, e)),
        }
    }

    fn issue_error(issue_id: u32, error: ComicVineError) -> anyhow::Error {
        anyhow::Error::new(error).context(format!("Failed to fetch issue {}", issue_id))
    }

    pub fn client(&self) -> &ComicVineClient {
        &self.client
    }
}
