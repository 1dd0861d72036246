//! Types for the acquisition stage.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CatalogError, ReleaseCandidate};
use crate::torrent_client::RemoteSessionError;

/// Errors from delivering a torrent file to its destination.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Directory does not exist: {0}")]
    DirectoryMissing(PathBuf),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote client error: {0}")]
    Remote(#[from] RemoteSessionError),
}

/// Destination for fetched torrent files.
#[async_trait]
pub trait TorrentSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Store or submit one torrent file. Returns the number of bytes delivered.
    async fn accept(&self, filename: &str, data: &[u8]) -> Result<u64, SinkError>;
}

/// Why a release could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionFailure {
    /// The torrent file could not be fetched from the catalog.
    Fetch(CatalogError),
    /// The sink refused or failed to store the file.
    Sink(String),
}

impl std::fmt::Display for AcquisitionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionFailure::Fetch(e) => write!(f, "fetch failed: {}", e),
            AcquisitionFailure::Sink(reason) => write!(f, "delivery failed: {}", reason),
        }
    }
}

/// Outcome of acquiring one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    Success { filename: String, bytes_written: u64 },
    Failure(AcquisitionFailure),
}

impl AcquisitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AcquisitionOutcome::Success { .. })
    }
}

/// One outcome per distinct selected release, in selection order.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    pub outcomes: Vec<(ReleaseCandidate, AcquisitionOutcome)>,
}

impl AcquisitionReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn get(&self, release: &ReleaseCandidate) -> Option<&AcquisitionOutcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| r == release)
            .map(|(_, o)| o)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ReleaseCandidate, &AcquisitionFailure)> {
        self.outcomes.iter().filter_map(|(r, o)| match o {
            AcquisitionOutcome::Failure(f) => Some((r, f)),
            AcquisitionOutcome::Success { .. } => None,
        })
    }
}
