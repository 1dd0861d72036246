//! Mock catalog client for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{CatalogClient, CatalogError, ReleaseGroup, TorrentPayload};
use crate::track::TrackDescriptor;

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The track that was searched.
    pub track: TrackDescriptor,
    pub restrict_album: bool,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the CatalogClient trait.
///
/// Provides controllable behavior for testing:
/// - Per-track search results, failures and delays
/// - Per-torrent payloads and fetch failures
/// - Authentication and download-buffer responses
///
/// Tracks without configured results search successfully and find nothing.
/// Torrents without a configured payload return `<id>.torrent`.
#[derive(Debug)]
pub struct MockCatalogClient {
    results: Arc<RwLock<HashMap<TrackDescriptor, Vec<ReleaseGroup>>>>,
    search_errors: Arc<RwLock<HashMap<TrackDescriptor, CatalogError>>>,
    search_delays: Arc<RwLock<HashMap<TrackDescriptor, Duration>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    torrents: Arc<RwLock<HashMap<u64, TorrentPayload>>>,
    fetch_errors: Arc<RwLock<HashMap<u64, CatalogError>>>,
    fetches: Arc<RwLock<Vec<u64>>>,
    /// If set, authentication fails with this error.
    auth_error: Arc<RwLock<Option<CatalogError>>>,
    auth_count: AtomicUsize,
    download_buffer: Arc<RwLock<Result<u64, CatalogError>>>,
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogClient {
    /// Create a mock catalog with no results and a 1 TiB download buffer.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            search_errors: Arc::new(RwLock::new(HashMap::new())),
            search_delays: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            torrents: Arc::new(RwLock::new(HashMap::new())),
            fetch_errors: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            auth_error: Arc::new(RwLock::new(None)),
            auth_count: AtomicUsize::new(0),
            download_buffer: Arc::new(RwLock::new(Ok(1 << 40))),
        }
    }

    /// Set the release groups returned when searching for `track`.
    pub async fn set_results(&self, track: &TrackDescriptor, groups: Vec<ReleaseGroup>) {
        self.results.write().await.insert(track.clone(), groups);
    }

    /// Make searches for `track` fail.
    pub async fn fail_search(&self, track: &TrackDescriptor, error: CatalogError) {
        self.search_errors.write().await.insert(track.clone(), error);
    }

    /// Delay searches for `track`.
    pub async fn set_search_delay(&self, track: &TrackDescriptor, delay: Duration) {
        self.search_delays.write().await.insert(track.clone(), delay);
    }

    /// Set the payload returned for a torrent id.
    pub async fn set_torrent(&self, torrent_id: u64, payload: TorrentPayload) {
        self.torrents.write().await.insert(torrent_id, payload);
    }

    /// Make fetching a torrent fail.
    pub async fn fail_fetch(&self, torrent_id: u64, error: CatalogError) {
        self.fetch_errors.write().await.insert(torrent_id, error);
    }

    /// Make authentication fail.
    pub async fn fail_authentication(&self, error: CatalogError) {
        *self.auth_error.write().await = Some(error);
    }

    /// Set the download buffer, or the error returned when querying it.
    pub async fn set_download_buffer(&self, buffer: Result<u64, CatalogError>) {
        *self.download_buffer.write().await = buffer;
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get fetched torrent ids in call order.
    pub async fn recorded_fetches(&self) -> Vec<u64> {
        self.fetches.read().await.clone()
    }

    /// Number of authentication attempts.
    pub fn auth_count(&self) -> usize {
        self.auth_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    fn name(&self) -> &str {
        "mock-catalog"
    }

    async fn authenticate(&self) -> Result<(), CatalogError> {
        self.auth_count.fetch_add(1, Ordering::SeqCst);
        match self.auth_error.read().await.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn search(
        &self,
        track: &TrackDescriptor,
        restrict_album: bool,
    ) -> Result<Vec<ReleaseGroup>, CatalogError> {
        self.searches.write().await.push(RecordedSearch {
            track: track.clone(),
            restrict_album,
            timestamp: Instant::now(),
        });

        let delay = self.search_delays.read().await.get(track).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.search_errors.read().await.get(track).cloned() {
            return Err(error);
        }

        Ok(self
            .results
            .read()
            .await
            .get(track)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_torrent(&self, torrent_id: u64) -> Result<TorrentPayload, CatalogError> {
        self.fetches.write().await.push(torrent_id);

        if let Some(error) = self.fetch_errors.read().await.get(&torrent_id).cloned() {
            return Err(error);
        }

        Ok(self
            .torrents
            .read()
            .await
            .get(&torrent_id)
            .cloned()
            .unwrap_or_else(|| TorrentPayload {
                filename: format!("{}.torrent", torrent_id),
                data: format!("d7:torrenti{}ee", torrent_id).into_bytes(),
            }))
    }

    async fn download_buffer(&self) -> Result<u64, CatalogError> {
        self.download_buffer.read().await.clone()
    }
}
