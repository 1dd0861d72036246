//! Fan-out/fan-in of catalog searches.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::{select_candidate, CatalogClient, VariantRanker};
use crate::track::TrackDescriptor;

use super::{SearchOutcome, SearchReport};

/// Searches the catalog for every unmatched track concurrently.
pub struct SearchCoordinator {
    client: Arc<dyn CatalogClient>,
    ranker: Arc<dyn VariantRanker>,
}

impl SearchCoordinator {
    pub fn new(client: Arc<dyn CatalogClient>, ranker: Arc<dyn VariantRanker>) -> Self {
        Self { client, ranker }
    }

    /// Search for one track and reduce the results to at most one release.
    async fn search_one(&self, track: &TrackDescriptor, restrict_album: bool) -> SearchOutcome {
        match self.client.search(track, restrict_album).await {
            Ok(groups) => {
                match select_candidate(track, &groups, restrict_album, self.ranker.as_ref()) {
                    Some(candidate) => {
                        debug!(track = %track, release = %candidate, "Selected release");
                        SearchOutcome::Candidate(candidate)
                    }
                    None => {
                        debug!(track = %track, groups = groups.len(), "No eligible release");
                        SearchOutcome::NoCandidate
                    }
                }
            }
            Err(e) => {
                warn!(track = %track, error = %e, "Catalog search failed");
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Search for all tracks, waiting for every search to finish.
    ///
    /// Searches are launched in input order and run interleaved on the
    /// calling task; a failed or slow search never cancels the others.
    /// Duplicate tracks are searched once. Results are keyed by track, in
    /// input order, regardless of completion order.
    pub async fn search(
        &self,
        unmatched: &[TrackDescriptor],
        restrict_album: bool,
    ) -> SearchReport {
        let start = Instant::now();

        let mut tracks: Vec<&TrackDescriptor> = Vec::with_capacity(unmatched.len());
        for track in unmatched {
            if !tracks.contains(&track) {
                tracks.push(track);
            }
        }

        info!(
            catalog = self.client.name(),
            tracks = tracks.len(),
            restrict_album,
            "Starting catalog search"
        );

        let searches = tracks.iter().map(|track| async move {
            let outcome = self.search_one(track, restrict_album).await;
            ((*track).clone(), outcome)
        });

        let results = futures::future::join_all(searches).await;

        let report = SearchReport {
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            total = report.total(),
            found = report.found_count(),
            missing = report.missing_count(),
            failed = report.failed_count(),
            duration_ms = report.duration_ms,
            "Catalog search complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::catalog::{CatalogError, QualityPreference, ReleaseGroup};
    use crate::testing::{fixtures, MockCatalogClient};

    const MB: u64 = 1024 * 1024;

    fn flac_group(id: u64, artist: &str, group_name: &str) -> Vec<ReleaseGroup> {
        vec![fixtures::release_group(
            id,
            artist,
            group_name,
            vec![fixtures::variant(id, "FLAC", "Lossless", MB)],
        )]
    }

    fn coordinator(client: &Arc<MockCatalogClient>) -> SearchCoordinator {
        SearchCoordinator::new(
            Arc::clone(client) as Arc<dyn CatalogClient>,
            Arc::new(QualityPreference::default()),
        )
    }

    #[tokio::test]
    async fn test_domain_is_exactly_unmatched() {
        let client = Arc::new(MockCatalogClient::new());
        let atmosphere = TrackDescriptor::new("Joy Division", "Atmosphere");
        let lies = TrackDescriptor::new("Low", "Lies");
        client
            .set_results(
                &atmosphere,
                vec![fixtures::release_group(
                    1,
                    "Joy Division",
                    "Closer",
                    vec![fixtures::variant(10, "FLAC", "Lossless", 40 * MB)],
                )],
            )
            .await;

        let unmatched = vec![atmosphere.clone(), lies.clone()];
        let report = coordinator(&client).search(&unmatched, false).await;

        let tracks: Vec<_> = report.results.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(tracks, unmatched);
        assert_eq!(report.found_count(), 1);
        assert_eq!(report.missing_count(), 1);
        assert_eq!(report.get(&lies), Some(&SearchOutcome::NoCandidate));
    }

    #[tokio::test]
    async fn test_transport_failures_isolated() {
        let client = Arc::new(MockCatalogClient::new());
        let a = TrackDescriptor::new("Joy Division", "Atmosphere");
        let b = TrackDescriptor::new("Low", "Lies");
        client
            .fail_search(&a, CatalogError::ConnectionFailed("reset".into()))
            .await;
        client.fail_search(&b, CatalogError::Timeout).await;

        let report = coordinator(&client)
            .search(&[a.clone(), b.clone()], false)
            .await;

        assert_eq!(report.total(), 2);
        assert_eq!(report.found_count(), 0);
        assert_eq!(report.missing_count(), 2);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(
            report.get(&b),
            Some(&SearchOutcome::Failed(CatalogError::Timeout))
        );
    }

    #[tokio::test]
    async fn test_slow_search_does_not_block_result_keying() {
        let client = Arc::new(MockCatalogClient::new());
        let slow = TrackDescriptor::new("Joy Division", "Atmosphere");
        let fast = TrackDescriptor::new("Joy Division", "Isolation");
        client
            .set_results(&slow, flac_group(1, "Joy Division", "Closer"))
            .await;
        client
            .set_results(&fast, flac_group(2, "Joy Division", "Still"))
            .await;
        client.set_search_delay(&slow, Duration::from_millis(50)).await;

        let report = coordinator(&client)
            .search(&[slow.clone(), fast.clone()], false)
            .await;

        assert_eq!(report.results[0].0, slow);
        assert_eq!(report.results[0].1.candidate().unwrap().group_name, "Closer");
        assert_eq!(report.results[1].1.candidate().unwrap().group_name, "Still");
    }

    #[tokio::test]
    async fn test_searches_run_concurrently() {
        let client = Arc::new(MockCatalogClient::new());
        let tracks: Vec<_> = (0..5)
            .map(|i| TrackDescriptor::new("Artist", format!("Track {}", i)))
            .collect();
        for track in &tracks {
            client.set_search_delay(track, Duration::from_millis(100)).await;
        }

        let start = Instant::now();
        let report = coordinator(&client).search(&tracks, false).await;

        assert_eq!(report.total(), 5);
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_restrict_album_forwarded() {
        let client = Arc::new(MockCatalogClient::new());
        let track = TrackDescriptor::new("Joy Division", "Atmosphere").with_album("Closer");
        client
            .set_results(
                &track,
                [
                    flac_group(1, "Joy Division", "Substance"),
                    flac_group(2, "Joy Division", "Closer"),
                ]
                .concat(),
            )
            .await;

        let report = coordinator(&client).search(&[track.clone()], true).await;
        assert_eq!(report.found().next().unwrap().1.group_name, "Closer");

        let searches = client.recorded_searches().await;
        assert_eq!(searches.len(), 1);
        assert!(searches[0].restrict_album);
    }

    #[tokio::test]
    async fn test_duplicates_searched_once() {
        let client = Arc::new(MockCatalogClient::new());
        let track = TrackDescriptor::new("Low", "Lies");

        let report = coordinator(&client)
            .search(&[track.clone(), track.clone()], false)
            .await;

        assert_eq!(report.total(), 1);
        assert_eq!(client.recorded_searches().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let client = Arc::new(MockCatalogClient::new());
        let report = coordinator(&client).search(&[], false).await;
        assert_eq!(report.total(), 0);
        assert_eq!(report.found_count(), 0);
    }
}
