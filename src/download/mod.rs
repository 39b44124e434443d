//! Fetching the raw bytes of a chosen photo size.

pub mod error;

pub use error::FetchError;

use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ByteSource: Send + Sync {
    /// GET `url` and return the whole body. Non-2xx statuses are errors.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// Photo CDN URLs are pre-signed, so a plain client is enough.
#[async_trait]
impl ByteSource for Client {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        let response = self.get(url).send().await.map_err(|e| FetchError::Http {
            source: e,
            url: url.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Http {
            source: e,
            url: url.to_string(),
        })?;
        tracing::debug!(url, size_bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
