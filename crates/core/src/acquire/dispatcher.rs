//! Concurrent fetch-and-deliver of selected releases.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::{ReleaseCandidate, TorrentFetcher};

use super::{AcquisitionFailure, AcquisitionOutcome, AcquisitionReport, TorrentSink};

/// Acquires every selected release, isolating per-release failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcquisitionDispatcher;

impl AcquisitionDispatcher {
    pub fn new() -> Self {
        Self
    }

    async fn acquire_one<F, S>(
        &self,
        release: &ReleaseCandidate,
        fetcher: &F,
        sink: &S,
    ) -> AcquisitionOutcome
    where
        F: TorrentFetcher + ?Sized,
        S: TorrentSink + ?Sized,
    {
        let payload = match fetcher.fetch(release.variant.torrent_id).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(release = %release, error = %e, "Failed to fetch torrent file");
                return AcquisitionOutcome::Failure(AcquisitionFailure::Fetch(e));
            }
        };

        match sink.accept(&payload.filename, &payload.data).await {
            Ok(bytes_written) => {
                debug!(
                    release = %release,
                    sink = sink.name(),
                    filename = %payload.filename,
                    "Acquired release"
                );
                AcquisitionOutcome::Success {
                    filename: payload.filename,
                    bytes_written,
                }
            }
            Err(e) => {
                warn!(
                    release = %release,
                    sink = sink.name(),
                    error = %e,
                    "Failed to deliver torrent file"
                );
                AcquisitionOutcome::Failure(AcquisitionFailure::Sink(e.to_string()))
            }
        }
    }

    /// Fetch and deliver every release concurrently.
    ///
    /// Each distinct release is attempted exactly once and gets exactly one
    /// outcome; one release failing never stops the others.
    pub async fn acquire<F, S>(
        &self,
        selected: &[ReleaseCandidate],
        fetcher: &F,
        sink: &S,
    ) -> AcquisitionReport
    where
        F: TorrentFetcher + ?Sized,
        S: TorrentSink + ?Sized,
    {
        let start = Instant::now();

        let mut releases: Vec<&ReleaseCandidate> = Vec::with_capacity(selected.len());
        for release in selected {
            if !releases.contains(&release) {
                releases.push(release);
            }
        }

        info!(releases = releases.len(), sink = sink.name(), "Starting acquisition");

        let attempts = releases.iter().map(|release| async move {
            let outcome = self.acquire_one(release, fetcher, sink).await;
            ((*release).clone(), outcome)
        });

        let report = AcquisitionReport {
            outcomes: futures::future::join_all(attempts).await,
        };

        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Acquisition complete"
        );

        report
    }
}
