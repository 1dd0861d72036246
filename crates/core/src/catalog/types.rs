//! Types for the external release catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::track::TrackDescriptor;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The user aborted authentication (e.g. declined to enter an API key).
    #[error("Authentication cancelled")]
    AuthCancelled,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Rate limited by catalog")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl CatalogError {
    /// Whether this error means the user or the server refused the session.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CatalogError::AuthCancelled | CatalogError::AuthenticationFailed(_)
        )
    }
}

/// One encoding/format/media combination of a release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TorrentVariant {
    /// Catalog torrent id, used to fetch the .torrent payload.
    pub torrent_id: u64,
    /// Source media (CD, WEB, Vinyl, ...).
    pub media: String,
    /// Container format (FLAC, MP3, ...).
    pub format: String,
    /// Encoding (Lossless, 320, V0 (VBR), ...).
    pub encoding: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
    #[serde(default)]
    pub seeders: u32,
}

/// A catalog-side release grouping one or more torrent variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseGroup {
    pub group_id: u64,
    pub artist: String,
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub variants: Vec<TorrentVariant>,
}

/// The release chosen for a missing track, with a single variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    pub artist: String,
    pub group_name: String,
    pub variant: TorrentVariant,
}

impl fmt::Display for ReleaseCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} [{}][{} {}]",
            self.artist,
            self.group_name,
            self.variant.media,
            self.variant.format,
            self.variant.encoding
        )
    }
}

/// A fetched .torrent file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentPayload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Trait for release catalogs.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Catalog name for logging.
    fn name(&self) -> &str;

    /// Establish (or verify) the API session.
    async fn authenticate(&self) -> Result<(), CatalogError>;

    /// Search for releases containing the track, best match first.
    ///
    /// An empty vector means the search succeeded but found nothing.
    async fn search(
        &self,
        track: &TrackDescriptor,
        restrict_album: bool,
    ) -> Result<Vec<ReleaseGroup>, CatalogError>;

    /// Download the .torrent payload for a variant.
    async fn fetch_torrent(&self, torrent_id: u64) -> Result<TorrentPayload, CatalogError>;

    /// Bytes the account can download without hurting its ratio.
    async fn download_buffer(&self) -> Result<u64, CatalogError>;
}

/// Anything that can turn a torrent id into a payload.
#[async_trait]
pub trait TorrentFetcher: Send + Sync {
    async fn fetch(&self, torrent_id: u64) -> Result<TorrentPayload, CatalogError>;
}

#[async_trait]
impl<C> TorrentFetcher for C
where
    C: CatalogClient + ?Sized,
{
    async fn fetch(&self, torrent_id: u64) -> Result<TorrentPayload, CatalogError> {
        self.fetch_torrent(torrent_id).await
    }
}
