use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::metrics::{UPSTREAM_REQUESTS, UPSTREAM_THROTTLED};
use crate::rate_limit::{RateState, pause};
use crate::upstream::{Transport, UpstreamResponse};

// Queued upstream call - holds the request + response channel
pub struct GateRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub response_tx: oneshot::Sender<Result<UpstreamResponse>>, // one-time channel to send back the response
}

/// Handle to the outbound request governor.
///
/// Every call to Discogs goes through one background task that owns the
/// [`RateState`]. Jobs are taken off the queue one at a time, so the wait,
/// the send and the state update for one request finish before the next
/// request is even considered. Callers only await their reply channel.
#[derive(Clone)]
pub struct RateGate {
    tx: mpsc::Sender<GateRequest>,
}

impl RateGate {
    // Spawn the worker on the current runtime
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (tx, rx) = mpsc::channel::<GateRequest>(100);
        tokio::spawn(async move {
            gate_worker(rx, transport).await;
        });
        Self { tx }
    }

    /// Send one GET once it is safe to do so.
    ///
    /// 429 responses are retried inside the gate until something else comes
    /// back. Any other status is handed to the caller untouched.
    pub async fn execute(&self, url: String, headers: HeaderMap) -> Result<UpstreamResponse> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(GateRequest {
                url,
                headers,
                response_tx,
            })
            .await
            .map_err(|_| Error::GateClosed)?;

        response_rx.await.map_err(|_| Error::GateClosed)?
    }
}

pub async fn gate_worker(mut rx: mpsc::Receiver<GateRequest>, transport: Arc<dyn Transport>) {
    tracing::info!("Rate gate started - sending upstream requests sequentially");
    let mut state = RateState::default();

    while let Some(job) = rx.recv().await {
        let result = send_throttled(&mut state, transport.as_ref(), &job.url, &job.headers).await;
        // caller may have gone away, the request still counted against the quota
        let _ = job.response_tx.send(result);
    }

    tracing::info!("Rate gate stopped");
}

// No retry cap: a server that keeps answering 429 keeps this request waiting
async fn send_throttled(
    state: &mut RateState,
    transport: &dyn Transport,
    url: &str,
    headers: &HeaderMap,
) -> Result<UpstreamResponse> {
    loop {
        state.wait_turn().await;

        let result = transport.get(url, headers).await;
        state.mark_sent();
        UPSTREAM_REQUESTS.inc();

        let response = result?;
        match response.status {
            StatusCode::OK => {
                state.observe_quota(&response.headers);
                return Ok(response);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                UPSTREAM_THROTTLED.inc();
                let backoff = state.observe_throttle(&response.headers);
                tracing::warn!(
                    "Rate limit exceeded, sleeping for {:.2} seconds",
                    backoff.as_secs_f64()
                );
                pause(backoff).await;
            }
            _ => return Ok(response),
        }
    }
}
