//! Types for the playlist pipeline.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::acquire::AcquisitionReport;
use crate::budget::BudgetReport;
use crate::catalog::CatalogError;
use crate::config::Config;
use crate::library::{LibraryError, MatchResult};
use crate::playlist::PlaylistError;
use crate::searcher::SearchReport;
use crate::torrent_client::RemoteSessionError;

/// Options fixed for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineOptions {
    /// Only accept library entries from the track's album.
    pub strict: bool,
    /// Only accept catalog releases named after the track's album.
    pub restrict_album: bool,
    /// Add torrents to the remote client paused.
    pub start_paused: bool,
    /// Override for the download budget; otherwise the catalog is asked.
    pub available_bytes: Option<u64>,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict: config.restrict_album,
            restrict_album: config.search.restrict_album,
            start_paused: config.remote.add_paused,
            available_bytes: config.budget.available_bytes,
        }
    }
}

/// Where a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStop {
    /// Every track was already in the library.
    AllMatched,
    /// The user said no at a confirmation point.
    Declined,
    /// The user backed out of catalog authentication.
    AuthCancelled,
    /// No missing track had an eligible release.
    NothingFound,
    /// Selected releases were dispatched.
    Completed,
}

/// Summary of one playlist run. Later stages are `None` when the run
/// stopped before reaching them.
#[derive(Debug, Clone)]
pub struct PlaylistReport {
    pub title: String,
    pub m3u_path: PathBuf,
    pub matches: MatchResult,
    pub search: Option<SearchReport>,
    pub budget: Option<BudgetReport>,
    pub acquisition: Option<AcquisitionReport>,
    pub stop: PipelineStop,
}

/// Errors that abort a playlist run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("Catalog authentication failed: {0}")]
    Authentication(CatalogError),

    #[error("Remote client unavailable: {0}")]
    RemoteSession(#[from] RemoteSessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_options_from_config() {
        let config = load_config_from_str(
            r#"
restrict_album = true

[library]
path = "/music/library.db"

[search]
restrict_album = false

[remote]
add_paused = true

[budget]
available_bytes = 1000
"#,
        )
        .unwrap();

        let options = PipelineOptions::from_config(&config);
        assert!(options.strict);
        assert!(!options.restrict_album);
        assert!(options.start_paused);
        assert_eq!(options.available_bytes, Some(1000));
    }
}
