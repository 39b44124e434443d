use thiserror::Error;

/// Errors from the Yandex Disk REST API.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("Disk API error (HTTP {status}, {error}): {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DiskError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DiskError::Api { status, .. } => Some(*status),
            DiskError::Http(e) => e.status().map(|s| s.as_u16()),
            DiskError::Json(_) => None,
        }
    }
}
