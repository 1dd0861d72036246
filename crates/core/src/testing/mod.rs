//! Testing utilities and mock implementations.
//!
//! This module provides in-memory stand-ins for every collaborator the
//! pipeline talks to, so whole runs can be exercised without a beets
//! database, catalog account or download client.
//!
//! # Example
//!
//! ```rust,ignore
//! use redlist_core::testing::{fixtures, MemoryLibrary, MockCatalogClient, MockSink};
//!
//! let library = MemoryLibrary::new(vec![
//!     fixtures::library_entry(1, "Joy Division", "Atmosphere", "Closer"),
//! ]);
//! let catalog = MockCatalogClient::new();
//! catalog.set_results(&track, vec![/* release groups */]).await;
//! let sink = MockSink::new();
//! ```

mod memory_library;
mod mock_catalog;
mod mock_remote_session;
mod mock_sink;

pub use memory_library::MemoryLibrary;
pub use mock_catalog::{MockCatalogClient, RecordedSearch};
pub use mock_remote_session::{MockRemoteConnector, MockRemoteSession, RecordedSubmission};
pub use mock_sink::MockSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{ReleaseCandidate, ReleaseGroup, TorrentVariant};
    use crate::library::LibraryEntry;

    /// Create a library entry with a plausible on-disk path.
    pub fn library_entry(id: i64, artist: &str, title: &str, album: &str) -> LibraryEntry {
        LibraryEntry {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            track: 1,
            path: format!("/music/{}/{}/{}.flac", artist, album, title),
        }
    }

    /// Create a CD-sourced torrent variant.
    pub fn variant(
        torrent_id: u64,
        format: &str,
        encoding: &str,
        size_bytes: u64,
    ) -> TorrentVariant {
        TorrentVariant {
            torrent_id,
            media: "CD".to_string(),
            format: format.to_string(),
            encoding: encoding.to_string(),
            size_bytes,
            seeders: 10,
        }
    }

    /// Create a release group.
    pub fn release_group(
        group_id: u64,
        artist: &str,
        group_name: &str,
        variants: Vec<TorrentVariant>,
    ) -> ReleaseGroup {
        ReleaseGroup {
            group_id,
            artist: artist.to_string(),
            group_name: group_name.to_string(),
            year: None,
            variants,
        }
    }

    /// Create a selected release with a FLAC Lossless variant.
    pub fn candidate(
        artist: &str,
        group_name: &str,
        torrent_id: u64,
        size_bytes: u64,
    ) -> ReleaseCandidate {
        ReleaseCandidate {
            artist: artist.to_string(),
            group_name: group_name.to_string(),
            variant: variant(torrent_id, "FLAC", "Lossless", size_bytes),
        }
    }
}
