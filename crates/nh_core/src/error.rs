use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Network-level failures worth another attempt after a pause.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            Error::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient() {
        let err = Error::Timeout {
            operation: "embed".to_string(),
            after: Duration::from_secs(30),
        };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "embed timed out after 30s");
    }

    #[test]
    fn test_application_errors_are_not_transient() {
        assert!(!Error::Precondition("empty query".to_string()).is_transient());
        assert!(!Error::NotFound("index".to_string()).is_transient());
        assert!(!Error::RateLimited("limit".to_string()).is_transient());
    }

    #[test]
    fn test_unavailable_message() {
        assert_eq!(
            Error::Unavailable("embedding service").to_string(),
            "embedding service is not configured"
        );
    }
}
