use serde::Deserialize;

/// Error code the API returns when creating a folder that already exists.
pub const FOLDER_EXISTS: &str = "DiskPathPointsToExistentDirectoryError";

/// `Link` object returned by `/resources/upload` (and by folder creation).
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

/// Body of every non-2xx API response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
}

impl ErrorBody {
    /// Prefer the localized `message`, fall back to the English `description`.
    pub fn text(&self) -> &str {
        if self.message.is_empty() {
            &self.description
        } else {
            &self.message
        }
    }
}
