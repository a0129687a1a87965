use thiserror::Error;

use crate::common::error::PanelError::GenericError;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl From<toml::de::Error> for PanelError {
    fn from(error: toml::de::Error) -> Self {
        Self::ConfigError(error.to_string())
    }
}

impl From<serde_json::error::Error> for PanelError {
    fn from(e: serde_json::error::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for PanelError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

impl From<String> for PanelError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}

pub fn error<T>(message: String) -> crate::Result<T> {
    Err(GenericError(message))
}

/// Failure of a single network fetch, classified so that the retry layer
/// can decide whether another attempt makes sense.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("all {0} configured sources failed")]
    AllSourcesFailed(usize),
}

impl FetchError {
    /// Transient network failures are worth retrying; auth failures and
    /// malformed payloads will not get better on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Connection(_)
            | FetchError::Timeout(_)
            | FetchError::Tls(_)
            | FetchError::Protocol(_)
            | FetchError::Io(_) => true,
            FetchError::Auth(_) | FetchError::Malformed(_) | FetchError::AllSourcesFailed(_) => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FetchError;

    #[test]
    fn transient_failures_are_retryable() {
        assert!(FetchError::Connection("refused".into()).is_retryable());
        assert!(FetchError::Timeout("30s elapsed".into()).is_retryable());
        assert!(FetchError::Tls("bad cert".into()).is_retryable());
        assert!(FetchError::Protocol("dns".into()).is_retryable());
        assert!(FetchError::Io(std::io::Error::other("socket")).is_retryable());
    }

    #[test]
    fn permanent_failures_are_not_retryable() {
        assert!(!FetchError::Auth("401".into()).is_retryable());
        assert!(!FetchError::Malformed("not ICS".into()).is_retryable());
        assert!(!FetchError::AllSourcesFailed(3).is_retryable());
    }
}
