//! Yandex Disk client. Creates folders and uploads files through the
//! two-step upload protocol: ask the API for an upload link, then send the
//! bytes to that link.

pub mod error;
pub mod responses;

pub use error::DiskError;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};

use responses::{ErrorBody, Link, FOLDER_EXISTS};

pub const DEFAULT_API_URL: &str = "https://cloud-api.yandex.net/v1/disk";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}

/// Write target handed out by the first upload step. Single use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub href: String,
    pub method: Method,
}

/// Remote file store with a folder-create call and a two-step upload.
///
/// The steps are exposed separately so callers can tell a refused upload
/// link apart from a failed byte transfer.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, DiskError>;

    /// Step one: obtain a write target for `path`. `Ok(None)` means the API
    /// answered without a usable link.
    async fn request_upload_target(
        &self,
        path: &str,
        overwrite: bool,
    ) -> Result<Option<UploadTarget>, DiskError>;

    /// Step two: send the file body to a target from step one.
    async fn push_bytes(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), DiskError>;
}

pub struct YandexDisk {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for YandexDisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexDisk")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl YandexDisk {
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn resources_url(&self, suffix: &str) -> String {
        format!("{}/resources{}", self.base_url.trim_end_matches('/'), suffix)
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }
}

/// Build a [`DiskError::Api`] from a non-2xx status and its raw body.
fn api_error(status: StatusCode, body: &str) -> DiskError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.text().is_empty() {
        body.trim().to_string()
    } else {
        parsed.text().to_string()
    };
    DiskError::Api {
        status: status.as_u16(),
        error: parsed.error,
        message,
    }
}

async fn error_from_response(response: Response) -> DiskError {
    let status = response.status();
    match response.text().await {
        Ok(body) => api_error(status, &body),
        Err(e) => DiskError::Http(e),
    }
}

/// A 409 on folder creation means "already there" unless the body names a
/// different conflict (for instance a file occupying the path).
fn is_existing_folder(body: &str) -> bool {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.is_empty() || parsed.error == FOLDER_EXISTS,
        Err(_) => true,
    }
}

#[async_trait]
impl RemoteStore for YandexDisk {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, DiskError> {
        let url = self.resources_url("");
        tracing::debug!(path, "PUT {}", url);
        let response = self
            .client
            .put(&url)
            .header(AUTHORIZATION, self.auth_header())
            .query(&[("path", path)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(FolderStatus::Created);
        }
        if status == StatusCode::CONFLICT {
            let body = response.text().await?;
            if is_existing_folder(&body) {
                return Ok(FolderStatus::AlreadyExists);
            }
            return Err(api_error(status, &body));
        }
        Err(error_from_response(response).await)
    }

    async fn request_upload_target(
        &self,
        path: &str,
        overwrite: bool,
    ) -> Result<Option<UploadTarget>, DiskError> {
        let url = self.resources_url("/upload");
        tracing::debug!(path, overwrite, "GET {}", url);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .query(&[("path", path), ("overwrite", if overwrite { "true" } else { "false" })])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        let link: Link = serde_json::from_str(&body)?;
        Ok(target_from_link(link))
    }

    async fn push_bytes(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), DiskError> {
        tracing::debug!(size_bytes = bytes.len(), "{} {}", target.method, target.href);
        // The upload link is pre-signed; the OAuth token is not sent to it.
        let response = self
            .client
            .request(target.method.clone(), &target.href)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

fn target_from_link(link: Link) -> Option<UploadTarget> {
    let href = link.href.filter(|h| !h.is_empty())?;
    let method = link
        .method
        .as_deref()
        .and_then(|m| Method::from_bytes(m.as_bytes()).ok())
        .unwrap_or(Method::PUT);
    Some(UploadTarget { href, method })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk() -> YandexDisk {
        YandexDisk::new(Client::new(), "https://cloud-api.yandex.net/v1/disk/", "y0_secret")
    }

    #[test]
    fn test_resources_url() {
        let d = disk();
        assert_eq!(
            d.resources_url(""),
            "https://cloud-api.yandex.net/v1/disk/resources"
        );
        assert_eq!(
            d.resources_url("/upload"),
            "https://cloud-api.yandex.net/v1/disk/resources/upload"
        );
    }

    #[test]
    fn test_auth_header_format() {
        assert_eq!(disk().auth_header(), "OAuth y0_secret");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", disk());
        assert!(!debug.contains("y0_secret"));
    }

    #[test]
    fn test_existing_folder_conflict() {
        let body = r#"{"error": "DiskPathPointsToExistentDirectoryError", "message": "exists"}"#;
        assert!(is_existing_folder(body));
        assert!(is_existing_folder(""));
        assert!(is_existing_folder("{}"));
    }

    #[test]
    fn test_other_conflict_is_not_existing_folder() {
        let body = r#"{"error": "DiskResourceAlreadyExistsError", "message": "file in the way"}"#;
        assert!(!is_existing_folder(body));
    }

    #[test]
    fn test_api_error_from_json_body() {
        let body = r#"{"error": "UnauthorizedError", "description": "Unauthorized", "message": "Не авторизован."}"#;
        match api_error(StatusCode::UNAUTHORIZED, body) {
            DiskError::Api {
                status,
                error,
                message,
            } => {
                assert_eq!(status, 401);
                assert_eq!(error, "UnauthorizedError");
                assert_eq!(message, "Не авторизован.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_from_plain_body() {
        match api_error(StatusCode::BAD_GATEWAY, "  bad gateway \n") {
            DiskError::Api { error, message, .. } => {
                assert!(error.is_empty());
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_target_from_link() {
        let link = Link {
            href: Some("https://uploader.example/target".into()),
            method: Some("PUT".into()),
        };
        let target = target_from_link(link).unwrap();
        assert_eq!(target.href, "https://uploader.example/target");
        assert_eq!(target.method, Method::PUT);
    }

    #[test]
    fn test_target_defaults_to_put() {
        let link = Link {
            href: Some("https://uploader.example/target".into()),
            method: None,
        };
        assert_eq!(target_from_link(link).unwrap().method, Method::PUT);
    }

    #[test]
    fn test_missing_href_is_no_target() {
        let missing = Link {
            href: None,
            method: Some("PUT".into()),
        };
        assert!(target_from_link(missing).is_none());

        let empty = Link {
            href: Some(String::new()),
            method: None,
        };
        assert!(target_from_link(empty).is_none());
    }
}
