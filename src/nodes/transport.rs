//! HTTP transport for backend info documents

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use url::Url;

use crate::Result;

/// Path every backend node serves its info document on, for bare-origin endpoints
pub const NODE_INFO_PATH: &str = "/info";

/// Info document location under a node endpoint
///
/// The endpoint's path is kept as a prefix, so `http://h:6000/v1` and
/// `http://h:6000/v1/` both resolve to `http://h:6000/v1/info`.
///
/// # Errors
///
/// Returns error if the endpoint cannot serve as a base URL
pub fn node_info_url(endpoint: &Url) -> Result<Url> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    Ok(base.join(NODE_INFO_PATH.trim_start_matches('/'))?)
}

/// Status, headers and body of one backend response
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests to backend nodes
#[async_trait]
pub trait InfoTransport: Send + Sync {
    /// GET `url`, returning whatever the node answered
    ///
    /// # Errors
    ///
    /// Returns error on connection failure or timeout; non-2xx statuses are
    /// not errors at this layer
    async fn get(&self, url: &Url) -> Result<RawResponse>;
}

/// `reqwest`-backed transport with per-call timeouts
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given connect and read timeouts
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .timeout(connect_timeout + read_timeout)
            .user_agent(concat!("swift-info-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl InfoTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(%url, status, bytes = body.len(), "backend info response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
