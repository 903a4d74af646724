//! Remote payload download
//!
//! Downloads are buffered in memory, so the fetcher enforces a byte cap and a
//! total timeout instead of trusting the remote server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Url};

use super::SourceDocument;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Request(String),

    #[error("{status} for url ({url})")]
    Status { status: reqwest::StatusCode, url: String },

    #[error("remote file exceeds the {max} byte download limit")]
    TooLarge { max: usize },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

/// Download caps applied to every fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub max_bytes: usize,
    pub timeout: Duration,
}

/// Source of remote payloads
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Download the document at `url` into memory
    async fn fetch(&self, url: &Url) -> Result<SourceDocument, FetchError>;
}

/// Fetcher backed by a shared `reqwest` client
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(limits: FetchLimits) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(limits.timeout)
            .user_agent(concat!("ocr-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_bytes: limits.max_bytes,
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<SourceDocument, FetchError> {
        tracing::debug!(%url, "Fetching remote document");

        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(FetchError::TooLarge { max: self.max_bytes });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Read chunk by chunk so a lying or absent Content-Length can't
        // push us past the cap
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge { max: self.max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(
            %url,
            size = bytes.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "Fetched remote document"
        );

        // The path alone, so a query string or fragment can't hide the extension
        Ok(SourceDocument::new(bytes, url.path(), content_type))
    }
}
