use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use tokio::time::{Instant, sleep};

use crate::metrics::{QUOTA_REMAINING, RATE_LIMIT_WAIT};

// Optimistic value for both quota and reset window until Discogs tells us otherwise
pub const DEFAULT_QUOTA: u32 = 60;
pub const DEFAULT_RESET_SECS: u64 = 60;
// Hard floor between two outbound requests
pub const MIN_SPACING: Duration = Duration::from_secs(1);

pub const REMAINING_HEADER: &str = "x-discogs-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-discogs-ratelimit-reset";

// Rate state - owned by the gate worker, never shared
#[derive(Debug)]
pub struct RateState {
    pub last_request_at: Option<Instant>, // None until the first request goes out
    pub remaining: u32,
    pub reset_or_backoff: Duration,
}

impl Default for RateState {
    fn default() -> Self {
        Self {
            last_request_at: None,
            remaining: DEFAULT_QUOTA,
            reset_or_backoff: Duration::from_secs(DEFAULT_RESET_SECS),
        }
    }
}

impl RateState {
    // Block until the next request may be sent
    pub async fn wait_turn(&mut self) {
        if self.remaining == 0 {
            tracing::debug!(
                "Rate limit exhausted, sleeping for {:.2} seconds",
                self.reset_or_backoff.as_secs_f64()
            );
            pause(self.reset_or_backoff).await;
            // real value is unknown until the next response
            self.remaining = DEFAULT_QUOTA;
        }

        if let Some(last) = self.last_request_at {
            let elapsed = last.elapsed();
            if elapsed < MIN_SPACING {
                let wait = MIN_SPACING - elapsed;
                tracing::debug!(
                    "Sleeping for {:.2} seconds to respect rate limit",
                    wait.as_secs_f64()
                );
                pause(wait).await;
            }
        }
    }

    pub fn mark_sent(&mut self) {
        self.last_request_at = Some(Instant::now());
    }

    // Learn quota from a 200 response
    pub fn observe_quota(&mut self, headers: &HeaderMap) {
        self.remaining = header_u64(headers, REMAINING_HEADER)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DEFAULT_QUOTA);
        self.reset_or_backoff =
            Duration::from_secs(header_u64(headers, RESET_HEADER).unwrap_or(DEFAULT_RESET_SECS));
        QUOTA_REMAINING.set(self.remaining as f64);
        tracing::debug!(
            "Rate limit remaining: {}, reset in: {} seconds",
            self.remaining,
            self.reset_or_backoff.as_secs()
        );
    }

    // Learn backoff from a 429 response
    pub fn observe_throttle(&mut self, headers: &HeaderMap) -> Duration {
        self.reset_or_backoff =
            Duration::from_secs(header_u64(headers, RETRY_AFTER.as_str()).unwrap_or(DEFAULT_RESET_SECS));
        self.reset_or_backoff
    }
}

pub async fn pause(duration: Duration) {
    RATE_LIMIT_WAIT.observe(duration.as_secs_f64());
    sleep(duration).await;
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
