use thiserror::Error;

/// VK API error code for a missing, expired, or revoked access token.
const AUTH_FAILED: i64 = 5;

/// Errors from the VK metadata fetch. Any of these ends the run.
#[derive(Debug, Error)]
pub enum VkError {
    /// VK reports most failures as an `error` object inside a 200 response.
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("VK API returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Unexpected VK API response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl VkError {
    /// Whether the access token was rejected.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, VkError::Api { code, .. } if *code == AUTH_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error() {
        let e = VkError::Api {
            code: 5,
            message: "User authorization failed: invalid access_token (4).".into(),
        };
        assert!(e.is_auth_error());
    }

    #[test]
    fn test_other_api_error_not_auth() {
        let e = VkError::Api {
            code: 30,
            message: "This profile is private".into(),
        };
        assert!(!e.is_auth_error());
        assert_eq!(e.to_string(), "VK API error 30: This profile is private");
    }

    #[test]
    fn test_http_status_not_auth() {
        assert!(!VkError::HttpStatus { status: 401 }.is_auth_error());
    }
}
