use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref RECONCILE_QUERIES: Counter =
        register_counter!("reconcile_queries_total", "Total number of reconciliation queries").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "reconcile_request_latency_seconds",
        "Reconcile request latency in seconds"
    )
    .unwrap();
    pub static ref UPSTREAM_REQUESTS: Counter =
        register_counter!("discogs_upstream_requests_total", "Requests sent to Discogs").unwrap();
    pub static ref UPSTREAM_THROTTLED: Counter =
        register_counter!("discogs_upstream_throttled_total", "429 responses from Discogs").unwrap();
    pub static ref RATE_LIMIT_WAIT: Histogram = register_histogram!(
        "discogs_rate_limit_wait_seconds",
        "Time spent sleeping in the rate gate"
    )
    .unwrap();
    pub static ref QUOTA_REMAINING: Gauge =
        register_gauge!("discogs_rate_limit_remaining", "Last reported remaining Discogs quota").unwrap();
}
