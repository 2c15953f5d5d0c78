use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Error, Result};

// Identifies this service to Discogs, which rejects anonymous clients
pub const SERVICE_USER_AGENT: &str =
    "Discogs Reconciliation Service/1.0 +https://github.com/rybesh/discogsreconciliation";

// Buffered upstream response - status, headers and the full body
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    // Decode the body, treating anything but 200 as a failure
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        if self.status != StatusCode::OK {
            return Err(Error::UpstreamStatus {
                status: self.status,
            });
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// One outbound GET. The rate gate is the only caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<UpstreamResponse>;
}

// Real transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<UpstreamResponse> {
        let res = self.client.get(url).headers(headers.clone()).send().await?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();
        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

// Headers every Discogs call carries
pub fn discogs_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    // tokens are ascii; a value reqwest refuses just leaves the header off
    if let Ok(value) = HeaderValue::from_str(&format!("Discogs token={token}")) {
        headers.insert(AUTHORIZATION, value);
    }
    headers.insert(USER_AGENT, HeaderValue::from_static(SERVICE_USER_AGENT));
    headers
}
