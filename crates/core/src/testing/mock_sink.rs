//! Mock torrent sink for testing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::acquire::{SinkError, TorrentSink};

/// Mock implementation of the TorrentSink trait.
///
/// Keeps accepted files in memory; specific filenames can be made to fail.
#[derive(Debug, Default)]
pub struct MockSink {
    accepted: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make accepting `filename` fail with `reason`.
    pub async fn fail_for(&self, filename: &str, reason: &str) {
        self.failures
            .write()
            .await
            .insert(filename.to_string(), reason.to_string());
    }

    /// Files accepted so far, in call order.
    pub async fn accepted(&self) -> Vec<(String, Vec<u8>)> {
        self.accepted.read().await.clone()
    }
}

#[async_trait]
impl TorrentSink for MockSink {
    fn name(&self) -> &str {
        "mock-sink"
    }

    async fn accept(&self, filename: &str, data: &[u8]) -> Result<u64, SinkError> {
        if let Some(reason) = self.failures.read().await.get(filename).cloned() {
            return Err(SinkError::WriteFailed {
                path: PathBuf::from(filename),
                source: std::io::Error::other(reason),
            });
        }

        self.accepted
            .write()
            .await
            .push((filename.to_string(), data.to_vec()));
        Ok(data.len() as u64)
    }
}
