//! Hands torrent files to a remote download-client session.

use std::sync::Arc;

use async_trait::async_trait;

use crate::torrent_client::RemoteSession;

use super::{SinkError, TorrentSink};

/// Submits torrents through an already-open [`RemoteSession`].
pub struct RemoteSink {
    session: Arc<dyn RemoteSession>,
    start_paused: bool,
}

impl RemoteSink {
    pub fn new(session: Arc<dyn RemoteSession>, start_paused: bool) -> Self {
        Self {
            session,
            start_paused,
        }
    }
}

#[async_trait]
impl TorrentSink for RemoteSink {
    fn name(&self) -> &str {
        self.session.name()
    }

    async fn accept(&self, filename: &str, data: &[u8]) -> Result<u64, SinkError> {
        self.session
            .submit(filename, data, self.start_paused)
            .await?;
        Ok(data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemoteSession;
    use crate::torrent_client::RemoteSessionError;

    #[tokio::test]
    async fn test_forwards_paused_flag() {
        let mock = Arc::new(MockRemoteSession::new());
        let sink = RemoteSink::new(mock.clone(), true);

        let bytes = sink.accept("Closer.torrent", b"d4:infoe").await.unwrap();

        assert_eq!(bytes, 8);
        let submissions = mock.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].filename, "Closer.torrent");
        assert!(submissions[0].start_paused);
    }

    #[tokio::test]
    async fn test_rejection_maps_to_sink_error() {
        let mock = Arc::new(MockRemoteSession::new());
        mock.set_submit_error(RemoteSessionError::Rejected("duplicate".into()))
            .await;
        let sink = RemoteSink::new(mock.clone(), false);

        let result = sink.accept("Closer.torrent", b"data").await;
        assert!(matches!(
            result,
            Err(SinkError::Remote(RemoteSessionError::Rejected(_)))
        ));
    }
}
