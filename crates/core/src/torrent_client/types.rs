//! Types for remote download-client sessions.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur talking to a remote download client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteSessionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Torrent rejected: {0}")]
    Rejected(String),

    #[error("Invalid torrent data: {0}")]
    InvalidTorrent(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Session already closed")]
    Closed,
}

/// An open connection to a remote download client.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Hand a .torrent file to the client.
    async fn submit(
        &self,
        filename: &str,
        data: &[u8],
        start_paused: bool,
    ) -> Result<(), RemoteSessionError>;

    /// Release the session. Further submissions fail with `Closed`.
    async fn close(&self) -> Result<(), RemoteSessionError>;
}

/// Opens remote sessions; one session is opened per pipeline run.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RemoteSession>, RemoteSessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RemoteSessionError::Rejected("duplicate".into()).to_string(),
            "Torrent rejected: duplicate"
        );
        assert_eq!(RemoteSessionError::Closed.to_string(), "Session already closed");
    }
}
