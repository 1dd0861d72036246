//! Mock remote download-client session for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::torrent_client::{RemoteConnector, RemoteSession, RemoteSessionError};

/// A torrent handed to the mock session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub filename: String,
    pub data: Vec<u8>,
    pub start_paused: bool,
}

/// Mock implementation of the RemoteSession trait.
///
/// Records submissions and counts closes. Submitting after close fails
/// with [`RemoteSessionError::Closed`].
#[derive(Debug, Default)]
pub struct MockRemoteSession {
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    /// If set, every submission fails with this error.
    submit_error: Arc<RwLock<Option<RemoteSessionError>>>,
    closed: AtomicBool,
    close_count: AtomicUsize,
}

impl MockRemoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent submission fail.
    pub async fn set_submit_error(&self, error: RemoteSessionError) {
        *self.submit_error.write().await = Some(error);
    }

    /// Get recorded submissions.
    pub async fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSession for MockRemoteSession {
    fn name(&self) -> &str {
        "mock-remote"
    }

    async fn submit(
        &self,
        filename: &str,
        data: &[u8],
        start_paused: bool,
    ) -> Result<(), RemoteSessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RemoteSessionError::Closed);
        }
        if let Some(error) = self.submit_error.read().await.clone() {
            return Err(error);
        }

        self.submissions.write().await.push(RecordedSubmission {
            filename: filename.to_string(),
            data: data.to_vec(),
            start_paused,
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), RemoteSessionError> {
        self.closed.store(true, Ordering::SeqCst);
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out a shared [`MockRemoteSession`].
#[derive(Debug, Default)]
pub struct MockRemoteConnector {
    session: Arc<MockRemoteSession>,
    connect_error: Option<RemoteSessionError>,
    connect_count: AtomicUsize,
}

impl MockRemoteConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every connection attempt fails.
    pub fn failing(error: RemoteSessionError) -> Self {
        Self {
            connect_error: Some(error),
            ..Self::default()
        }
    }

    /// The session handed out by `connect`.
    pub fn session(&self) -> Arc<MockRemoteSession> {
        Arc::clone(&self.session)
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteConnector for MockRemoteConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteSession>, RemoteSessionError> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        match &self.connect_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.session()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_after_close_fails() {
        let session = MockRemoteSession::new();
        session.close().await.unwrap();

        let result = session.submit("a.torrent", b"data", false).await;
        assert_eq!(result, Err(RemoteSessionError::Closed));
        assert_eq!(session.close_count(), 1);
    }

    #[tokio::test]
    async fn test_connector_shares_session() {
        let connector = MockRemoteConnector::new();
        let session = connector.connect().await.unwrap();
        session.submit("a.torrent", b"data", true).await.unwrap();

        assert_eq!(connector.session().submissions().await.len(), 1);
        assert_eq!(connector.connect_count(), 1);
    }
}
