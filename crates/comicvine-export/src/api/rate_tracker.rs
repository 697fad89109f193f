//! Per-endpoint request quota tracking.
//!
//! Comic Vine enforces a request budget per resource per hour. Each endpoint
//! gets its own counter window; once the budget is spent, callers block until
//! the window rolls over.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// The four Comic Vine resources this tool talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Volume,
    Issues,
    Issue,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Search,
        Endpoint::Volume,
        Endpoint::Issues,
        Endpoint::Issue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Search => "/search",
            Endpoint::Volume => "/volume",
            Endpoint::Issues => "/issues",
            Endpoint::Issue => "/issue",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage of one endpoint within the current window
#[derive(Debug, Clone)]
pub struct EndpointQuota {
    pub endpoint: Endpoint,
    /// Requests authorized in the current window
    pub request_count: u32,
    /// When the current window ends
    pub window_reset_at: Instant,
}

impl EndpointQuota {
    fn new(endpoint: Endpoint, window_reset_at: Instant) -> Self {
        Self {
            endpoint,
            request_count: 0,
            window_reset_at,
        }
    }
}

/// Rate tracker with a fixed request budget per endpoint per window
#[derive(Debug)]
pub struct RateTracker {
    /// Maximum requests per endpoint per window
    max_requests: u32,
    /// Window length
    window: Duration,
    quotas: HashMap<Endpoint, EndpointQuota>,
}

impl RateTracker {
    /// Create a tracker; every endpoint starts with an empty window ending one
    /// window length from now
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let reset_at = Instant::now() + window;
        let quotas = Endpoint::ALL
            .iter()
            .map(|&endpoint| (endpoint, EndpointQuota::new(endpoint, reset_at)))
            .collect();

        Self {
            max_requests,
            window,
            quotas,
        }
    }

    /// Wait until a request to `endpoint` fits the budget, then count it
    pub async fn authorize(&mut self, endpoint: Endpoint) {
        let max_requests = self.max_requests;
        let window = self.window;
        let now = Instant::now();

        let quota = self
            .quotas
            .entry(endpoint)
            .or_insert_with(|| EndpointQuota::new(endpoint, now + window));

        if now >= quota.window_reset_at {
            debug!(endpoint = %endpoint, "Quota window elapsed, resetting count");
            quota.request_count = 0;
            quota.window_reset_at = now + window;
        }

        if quota.request_count >= max_requests {
            let wait = quota.window_reset_at.saturating_duration_since(now);
            info!(
                endpoint = %endpoint,
                wait_secs = wait.as_secs(),
                "Rate limit reached, waiting for quota window to reset"
            );
            sleep_until(quota.window_reset_at).await;
            quota.request_count = 0;
            quota.window_reset_at = Instant::now() + window;
        }

        quota.request_count += 1;
    }

    /// Current usage for an endpoint
    pub fn quota(&self, endpoint: Endpoint) -> Option<&EndpointQuota> {
        self.quotas.get(&endpoint)
    }

    /// Requests counted against `endpoint` in its current window
    pub fn request_count(&self, endpoint: Endpoint) -> u32 {
        self.quota(endpoint).map_or(0, |q| q.request_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn test_initial_window() {
        let start = Instant::now();
        let tracker = RateTracker::new(200, HOUR);

        for endpoint in Endpoint::ALL {
            let quota = tracker.quota(endpoint).unwrap();
            assert_eq!(quota.request_count, 0);
            assert_eq!(quota.window_reset_at, start + HOUR);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorize_counts_requests() {
        let mut tracker = RateTracker::new(200, HOUR);

        tracker.authorize(Endpoint::Issues).await;
        tracker.authorize(Endpoint::Issues).await;

        assert_eq!(tracker.request_count(Endpoint::Issues), 2);
        assert_eq!(tracker.request_count(Endpoint::Issue), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_once_quota_is_spent() {
        let mut tracker = RateTracker::new(200, HOUR);
        let start = Instant::now();

        for _ in 0..200 {
            tracker.authorize(Endpoint::Issue).await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(tracker.request_count(Endpoint::Issue), 200);

        let reset_at = tracker.quota(Endpoint::Issue).unwrap().window_reset_at;
        tracker.authorize(Endpoint::Issue).await;

        assert!(Instant::now() >= reset_at);
        assert!(start.elapsed() >= HOUR);

        let quota = tracker.quota(Endpoint::Issue).unwrap();
        assert_eq!(quota.request_count, 1);
        assert!(quota.window_reset_at >= reset_at + HOUR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_never_exceeds_budget() {
        let mut tracker = RateTracker::new(5, Duration::from_secs(60));

        for _ in 0..23 {
            tracker.authorize(Endpoint::Search).await;
            assert!(tracker.request_count(Endpoint::Search) <= 5);
        }
        // 23 calls at 5 per window: four full windows plus three
        assert_eq!(tracker.request_count(Endpoint::Search), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_window_resets_count() {
        let mut tracker = RateTracker::new(200, HOUR);

        for _ in 0..150 {
            tracker.authorize(Endpoint::Issues).await;
        }
        assert_eq!(tracker.request_count(Endpoint::Issues), 150);

        advance(HOUR + Duration::from_secs(1)).await;
        let before = Instant::now();
        tracker.authorize(Endpoint::Issues).await;

        let quota = tracker.quota(Endpoint::Issues).unwrap();
        assert_eq!(quota.request_count, 1);
        assert_eq!(quota.window_reset_at, before + HOUR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_exactly_at_boundary_happens_once() {
        let mut tracker = RateTracker::new(200, HOUR);
        tracker.authorize(Endpoint::Volume).await;

        advance(HOUR).await;
        let boundary = Instant::now();

        tracker.authorize(Endpoint::Volume).await;
        tracker.authorize(Endpoint::Volume).await;

        let quota = tracker.quota(Endpoint::Volume).unwrap();
        assert_eq!(quota.request_count, 2);
        assert_eq!(quota.window_reset_at, boundary + HOUR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endpoints_are_independent() {
        let mut tracker = RateTracker::new(2, HOUR);
        let start = Instant::now();

        tracker.authorize(Endpoint::Issue).await;
        tracker.authorize(Endpoint::Issue).await;
        tracker.authorize(Endpoint::Volume).await;
        tracker.authorize(Endpoint::Search).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(tracker.request_count(Endpoint::Issue), 2);
        assert_eq!(tracker.request_count(Endpoint::Volume), 1);
    }

    #[test]
    fn test_endpoint_names() {
        assert_eq!(Endpoint::Search.to_string(), "/search");
        assert_eq!(Endpoint::Issues.as_str(), "/issues");
    }
}
