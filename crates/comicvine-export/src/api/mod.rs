//! Comic Vine API client implementation.
//!
//! This module provides a quota-tracked client for the four Comic Vine
//! resources the exporter uses: search, volume, issue list and issue.

pub mod client;
pub mod rate_tracker;
pub mod types;

pub use client::ComicVineClient;
pub use rate_tracker::{Endpoint, EndpointQuota, RateTracker};
pub use types::*;
