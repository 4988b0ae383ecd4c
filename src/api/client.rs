use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::Result;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL.
///
/// Only transport failures are errors; any status the server answers with is
/// returned as a [`FetchResponse`].
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn request(&self, url: &str) -> Result<FetchResponse>;
}

/// [`Fetch`] over a real HTTP client
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("userdash/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn request(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url, status, bytes = body.len(), "Fetched");

        Ok(FetchResponse { status, body })
    }
}
