use std::time::{Duration, Instant};

use reqwest::{header::CONTENT_TYPE, Client};
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const DEFAULT_USER_AGENT: &str = concat!("pagecapture/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ResourceFetcher {
    client: Client,
}

impl ResourceFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = declared_content_type(response.headers());
        let bytes = response.bytes().await?;

        tracing::debug!(
            %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "fetched resource"
        );

        Ok(FetchResult {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

pub(crate) fn declared_content_type(headers: &reqwest::header::HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
