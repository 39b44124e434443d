//! VK API client. Fetches a user's photo metadata with `photos.get`.

pub mod error;
pub mod responses;

pub use error::VkError;

use async_trait::async_trait;
use reqwest::Client;

use crate::photos::PhotoRecord;

pub const DEFAULT_API_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.199";

/// Source of photo metadata for one user.
///
/// Object-safe so the pipeline can run against `&dyn PhotoSource`.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch every photo of `user_id` in `album` with a single request.
    /// An empty vector means the user has no photos there.
    async fn fetch_photos(&self, user_id: &str, album: &str)
        -> Result<Vec<PhotoRecord>, VkError>;
}

pub struct VkClient {
    client: Client,
    base_url: String,
    access_token: String,
    version: String,
}

impl std::fmt::Debug for VkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VkClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl VkClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
            version: version.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), method)
    }
}

#[async_trait]
impl PhotoSource for VkClient {
    async fn fetch_photos(
        &self,
        user_id: &str,
        album: &str,
    ) -> Result<Vec<PhotoRecord>, VkError> {
        let url = self.method_url("photos.get");
        tracing::debug!(user_id, album, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("owner_id", user_id),
                ("album_id", album),
                ("extended", "1"),
                ("photo_sizes", "1"),
                ("access_token", self.access_token.as_str()),
                ("v", self.version.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VkError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: responses::Envelope = serde_json::from_str(&body)?;
        responses::into_photos(envelope)
    }
}
