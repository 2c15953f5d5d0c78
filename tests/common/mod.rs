#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use discogs_reconcile::config::Config;
use discogs_reconcile::error::{Error, Result};
use discogs_reconcile::upstream::{Transport, UpstreamResponse};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::time::Instant;

// One recorded outbound call
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub headers: HeaderMap,
    pub at: Instant,
}

/// In-memory Discogs: replays scripted answers in order and records each
/// call with the (possibly paused) tokio clock. An empty script answers
/// 200 with no search results.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<UpstreamResponse, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, headers: &[(&'static str, &'static str)], body: &str) {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(HeaderName::from_static(*name), HeaderValue::from_static(*value));
        }
        self.script.lock().unwrap().push_back(Ok(UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: map,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<UpstreamResponse> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            headers: headers.clone(),
            at: Instant::now(),
        });

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => Ok(UpstreamResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: br#"{"results": []}"#.to_vec(),
            }),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        token: "test-token".to_string(),
        discogs_user: None,
        addr: "127.0.0.1:0".parse().unwrap(),
        api_base: "https://api.discogs.test".to_string(),
        public_base: "https://www.discogs.com".to_string(),
        log_level: "info".to_string(),
    }
}
