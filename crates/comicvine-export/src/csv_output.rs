//! CSV output for exported issues.

use crate::api::IssueDetails;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Placeholder for missing publisher or notes
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers, in output order
pub const HEADERS: [&str; 7] = [
    "Issue Name",
    "Published By",
    "Issue",
    "Cover Date",
    "In Store Date",
    "Creators",
    "Key Issue Notes",
];

/// One exported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRow {
    #[serde(rename = "Issue Name")]
    pub name: Option<String>,
    #[serde(rename = "Published By")]
    pub published_by: String,
    #[serde(rename = "Issue")]
    pub issue_number: Option<String>,
    #[serde(rename = "Cover Date")]
    pub cover_date: Option<String>,
    #[serde(rename = "In Store Date")]
    pub store_date: Option<String>,
    #[serde(rename = "Creators")]
    pub creators: String,
    #[serde(rename = "Key Issue Notes")]
    pub notes: String,
}

impl IssueRow {
    pub fn from_details(details: &IssueDetails, published_by: &str) -> Self {
        let creators = details
            .credits()
            .iter()
            .map(|person| format!("{} - {}", person.name, person.role))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            name: details.name.clone(),
            published_by: published_by.to_string(),
            issue_number: details.issue_number.clone(),
            cover_date: details.cover_date.clone(),
            store_date: details.store_date.clone(),
            creators,
            notes: details
                .deck
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// CSV writer that emits the header up front and flushes after each row
pub struct IssueWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl IssueWriter<File> {
    /// Create (or truncate) the output file and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Self::from_writer(file)
    }
}

impl<W: Write> IssueWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer
            .write_record(HEADERS)
            .context("Failed to write CSV header")?;
        writer.flush().context("Failed to flush CSV output")?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append a row; the row is on disk when this returns
    pub fn write_row(&mut self, row: &IssueRow) -> Result<()> {
        self.writer
            .serialize(row)
            .context("Failed to write CSV row")?;
        self.writer.flush().context("Failed to flush CSV output")?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}
