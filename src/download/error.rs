use thiserror::Error;

/// Failure fetching one photo's bytes. Only that photo is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        source: reqwest::Error,
        url: String,
    },

    #[error("Photo size has no URL")]
    EmptyUrl,
}

impl FetchError {
    /// Whether the request ran into the client's timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Http { source, .. } => source.is_timeout(),
            FetchError::HttpStatus { .. } | FetchError::EmptyUrl => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let e = FetchError::HttpStatus {
            status: 404,
            url: "https://example.com/a.jpg".into(),
        };
        assert_eq!(e.to_string(), "HTTP error 404 fetching https://example.com/a.jpg");
        assert!(!e.is_timeout());
    }

    #[test]
    fn test_empty_url_not_timeout() {
        assert!(!FetchError::EmptyUrl.is_timeout());
    }

    #[tokio::test]
    async fn test_connection_error_not_timeout() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        let e = FetchError::Http {
            source: err,
            url: "x".into(),
        };
        assert!(!e.is_timeout());
    }
}
