//! The playlist pipeline runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::acquire::{AcquisitionDispatcher, AcquisitionReport, LocalSink, RemoteSink};
use crate::budget::{check_budget, format_size};
use crate::catalog::{CatalogClient, CatalogError, ReleaseCandidate, VariantRanker};
use crate::library::{match_playlist, LibraryIndex};
use crate::playlist::{m3u_path, read_playlist, write_m3u, Playlist};
use crate::searcher::{SearchCoordinator, SearchOutcome};
use crate::torrent_client::{with_session, RemoteConnector};

use super::{Confirm, PipelineError, PipelineOptions, PipelineStop, PlaylistReport};

/// Where acquired torrents go.
pub enum AcquisitionTarget {
    /// Save .torrent files into a directory.
    Directory(PathBuf),
    /// Submit to a remote download client; one session per run.
    Remote(Arc<dyn RemoteConnector>),
}

/// Runs playlists through match, search, budget check and acquisition.
pub struct Pipeline {
    options: PipelineOptions,
    library: Arc<dyn LibraryIndex>,
    catalog: Arc<dyn CatalogClient>,
    ranker: Arc<dyn VariantRanker>,
    target: AcquisitionTarget,
    confirm: Arc<dyn Confirm>,
    m3u_directory: PathBuf,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(
        options: PipelineOptions,
        library: Arc<dyn LibraryIndex>,
        catalog: Arc<dyn CatalogClient>,
        ranker: Arc<dyn VariantRanker>,
        target: AcquisitionTarget,
        confirm: Arc<dyn Confirm>,
        m3u_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            options,
            library,
            catalog,
            ranker,
            target,
            confirm,
            m3u_directory: m3u_directory.into(),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Read a playlist file and run it.
    pub async fn run_file(&self, path: &Path) -> Result<PlaylistReport, PipelineError> {
        let playlist = read_playlist(path)?;
        self.run(&playlist).await
    }

    /// Run one playlist.
    ///
    /// Files written before a stop (the M3U, earlier torrents) are kept.
    pub async fn run(&self, playlist: &Playlist) -> Result<PlaylistReport, PipelineError> {
        info!(playlist = %playlist.title, tracks = playlist.tracks.len(), "Processing playlist");

        let matches = match_playlist(&playlist.tracks, self.library.as_ref(), self.options.strict)?;
        let m3u = m3u_path(&self.m3u_directory, &playlist.title);
        write_m3u(&matches, &m3u)?;

        let mut report = PlaylistReport {
            title: playlist.title.clone(),
            m3u_path: m3u,
            matches,
            search: None,
            budget: None,
            acquisition: None,
            stop: PipelineStop::AllMatched,
        };

        let unmatched = report.matches.unmatched();
        if unmatched.is_empty() {
            info!(playlist = %playlist.title, "All tracks are in the library");
            return Ok(report);
        }

        let lines: Vec<String> = unmatched.iter().map(|t| t.to_string()).collect();
        self.confirm.show(
            "The following tracks could not be matched to the library:",
            &lines,
        );
        if !self.confirm.confirm(&format!(
            "Search {} for {} missing tracks?",
            self.catalog.name(),
            unmatched.len()
        )) {
            return Ok(stopped(report, PipelineStop::Declined));
        }

        match self.catalog.authenticate().await {
            Ok(()) => {}
            Err(CatalogError::AuthCancelled) => {
                info!("Catalog authentication cancelled");
                return Ok(stopped(report, PipelineStop::AuthCancelled));
            }
            Err(e) => return Err(PipelineError::Authentication(e)),
        }

        let coordinator =
            SearchCoordinator::new(Arc::clone(&self.catalog), Arc::clone(&self.ranker));
        let search = coordinator.search(&unmatched, self.options.restrict_album).await;

        let missing: Vec<String> = search
            .missing()
            .map(|(track, outcome)| match outcome {
                SearchOutcome::Failed(e) => format!("{} (search failed: {})", track, e),
                _ => track.to_string(),
            })
            .collect();
        if !missing.is_empty() {
            self.confirm
                .show("No release found for these tracks:", &missing);
        }

        let selected = search.selected_releases();
        report.search = Some(search);
        if selected.is_empty() {
            info!(playlist = %playlist.title, "No releases found for missing tracks");
            return Ok(stopped(report, PipelineStop::NothingFound));
        }

        let lines: Vec<String> = selected.iter().map(|r| r.to_string()).collect();
        self.confirm.show("Releases to download:", &lines);
        if !self.confirm.confirm(&format!("Download {} torrents?", selected.len())) {
            return Ok(stopped(report, PipelineStop::Declined));
        }

        if let Some(available) = self.available_bytes().await {
            let budget = check_budget(&selected, available);
            report.budget = Some(budget);

            if let Some(shortfall) = budget.shortfall {
                warn!(
                    total = budget.total_bytes,
                    available, shortfall, "Selection exceeds download budget"
                );
                if !self.confirm.confirm(&format!(
                    "Downloading {} would exceed the available {} by {}. Continue?",
                    format_size(budget.total_bytes),
                    format_size(available),
                    format_size(shortfall)
                )) {
                    return Ok(stopped(report, PipelineStop::Declined));
                }
            } else {
                info!(
                    total = %format_size(budget.total_bytes),
                    remaining = %format_size(budget.projected_remaining),
                    "Selection fits the download budget"
                );
            }
        }

        report.acquisition = Some(self.dispatch(&selected).await?);
        Ok(stopped(report, PipelineStop::Completed))
    }

    /// The configured budget, or the catalog account's buffer.
    async fn available_bytes(&self) -> Option<u64> {
        if let Some(bytes) = self.options.available_bytes {
            return Some(bytes);
        }
        match self.catalog.download_buffer().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Could not query download buffer, skipping budget check");
                None
            }
        }
    }

    async fn dispatch(
        &self,
        selected: &[ReleaseCandidate],
    ) -> Result<AcquisitionReport, PipelineError> {
        let dispatcher = AcquisitionDispatcher::new();
        let catalog = self.catalog.as_ref();

        let report = match &self.target {
            AcquisitionTarget::Directory(dir) => {
                let sink = LocalSink::new(dir.clone());
                dispatcher.acquire(selected, catalog, &sink).await
            }
            AcquisitionTarget::Remote(connector) => {
                let session = connector.connect().await?;
                let start_paused = self.options.start_paused;
                with_session(session, |session| async move {
                    let sink = RemoteSink::new(session, start_paused);
                    dispatcher.acquire(selected, catalog, &sink).await
                })
                .await
            }
        };

        Ok(report)
    }
}

fn stopped(mut report: PlaylistReport, stop: PipelineStop) -> PlaylistReport {
    report.stop = stop;
    report
}
