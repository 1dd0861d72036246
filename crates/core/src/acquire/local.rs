//! Saves torrent files into a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{SinkError, TorrentSink};

/// Writes each torrent file into a directory, replacing same-named files.
pub struct LocalSink {
    directory: PathBuf,
}

impl LocalSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Strip path separators so a catalog-supplied name cannot escape the directory.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "download.torrent".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl TorrentSink for LocalSink {
    fn name(&self) -> &str {
        "local"
    }

    async fn accept(&self, filename: &str, data: &[u8]) -> Result<u64, SinkError> {
        let is_dir = tokio::fs::metadata(&self.directory)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SinkError::DirectoryMissing(self.directory.clone()));
        }

        let path = self.directory.join(sanitize_filename(filename));
        tokio::fs::write(&path, data)
            .await
            .map_err(|source| SinkError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = data.len(), "Saved torrent file");
        Ok(data.len() as u64)
    }
}
