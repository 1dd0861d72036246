//! Types for the search stage.

use crate::catalog::{CatalogError, ReleaseCandidate};
use crate::track::TrackDescriptor;

/// Outcome of searching the catalog for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A release was selected.
    Candidate(ReleaseCandidate),
    /// The search succeeded but no eligible release exists.
    NoCandidate,
    /// The search itself failed.
    Failed(CatalogError),
}

impl SearchOutcome {
    pub fn candidate(&self) -> Option<&ReleaseCandidate> {
        match self {
            SearchOutcome::Candidate(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Candidate(_))
    }
}

/// Aggregated search results, one entry per unmatched track in input order.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub results: Vec<(TrackDescriptor, SearchOutcome)>,
    /// How long the whole fan-out took in milliseconds.
    pub duration_ms: u64,
}

impl SearchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn found_count(&self) -> usize {
        self.results.iter().filter(|(_, o)| o.is_found()).count()
    }

    /// Tracks without a candidate, including failed searches.
    pub fn missing_count(&self) -> usize {
        self.total() - self.found_count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, o)| matches!(o, SearchOutcome::Failed(_)))
            .count()
    }

    /// Outcome for a track, if it was part of the search.
    pub fn get(&self, track: &TrackDescriptor) -> Option<&SearchOutcome> {
        self.results
            .iter()
            .find(|(t, _)| t == track)
            .map(|(_, o)| o)
    }

    /// Tracks with their selected release.
    pub fn found(&self) -> impl Iterator<Item = (&TrackDescriptor, &ReleaseCandidate)> {
        self.results
            .iter()
            .filter_map(|(t, o)| o.candidate().map(|c| (t, c)))
    }

    /// Tracks without a candidate with the reason, in input order.
    pub fn missing(&self) -> impl Iterator<Item = (&TrackDescriptor, &SearchOutcome)> {
        self.results.iter().filter(|(_, o)| !o.is_found()).map(|(t, o)| (t, o))
    }

    /// Distinct selected releases in first-seen order.
    ///
    /// Several tracks from the same album select the same release; it is
    /// acquired only once.
    pub fn selected_releases(&self) -> Vec<ReleaseCandidate> {
        let mut releases: Vec<ReleaseCandidate> = Vec::new();
        for (_, candidate) in self.found() {
            if !releases.contains(candidate) {
                releases.push(candidate.clone());
            }
        }
        releases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn report() -> SearchReport {
        let closer = fixtures::candidate("Joy Division", "Closer", 1, 100);
        SearchReport {
            results: vec![
                (
                    TrackDescriptor::new("Joy Division", "Atmosphere"),
                    SearchOutcome::Candidate(closer.clone()),
                ),
                (
                    TrackDescriptor::new("Joy Division", "Isolation"),
                    SearchOutcome::Candidate(closer),
                ),
                (TrackDescriptor::new("Low", "Lies"), SearchOutcome::NoCandidate),
                (
                    TrackDescriptor::new("Slint", "Good Morning, Captain"),
                    SearchOutcome::Failed(CatalogError::Timeout),
                ),
            ],
            duration_ms: 5,
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.total(), 4);
        assert_eq!(report.found_count(), 2);
        assert_eq!(report.missing_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.found_count() + report.missing_count(), report.total());
    }

    #[test]
    fn test_missing_keeps_reason() {
        let report = report();
        let missing: Vec<_> = report.missing().collect();
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].1, &SearchOutcome::NoCandidate);
        assert_eq!(missing[1].1, &SearchOutcome::Failed(CatalogError::Timeout));
    }

    #[test]
    fn test_selected_releases_deduplicated() {
        let releases = report().selected_releases();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].group_name, "Closer");
    }

    #[test]
    fn test_get() {
        let report = report();
        assert!(report
            .get(&TrackDescriptor::new("Low", "Lies"))
            .is_some_and(|o| !o.is_found()));
        assert!(report.get(&TrackDescriptor::new("Low", "Sunflower")).is_none());
    }
}
