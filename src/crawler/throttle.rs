use std::time::{Duration, Instant};

/// Run-wide request pacing
///
/// Every outbound request of a run (index page, seed pages, scroll fragments,
/// detail pages) goes to the same site, so one throttle covers them all.
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Minimum time between two requests
    pub min_delay: Duration,

    /// Number of requests made so far
    pub request_count: u32,

    /// When the last request was sent
    pub last_request_time: Option<Instant>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            request_count: 0,
            last_request_time: None,
        }
    }

    /// Checks if a request can be made at `now` without waiting
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_delay {
            Some(self.min_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was sent at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Waits until the next request is allowed, then records it
    ///
    /// The wait is awaited inline; the caller's flow is held for its duration.
    pub async fn acquire(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::debug!("Waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }
}
