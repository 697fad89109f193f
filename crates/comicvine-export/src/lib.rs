//! Comic Vine series exporter library.
//!
//! This library enumerates every issue of a Comic Vine volume, fetches per-issue
//! bibliographic data and writes it to CSV, staying under the API's
//! per-endpoint hourly quota.

pub mod api;
pub mod csv_output;
pub mod error;
pub mod exporter;

pub use api::{ComicVineClient, Endpoint, RateTracker};
pub use csv_output::{IssueRow, IssueWriter};
pub use error::ComicVineError;
pub use exporter::{ExportStats, SeriesExporter};
