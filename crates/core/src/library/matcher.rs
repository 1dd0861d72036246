//! Playlist-to-library matching.

use serde::Serialize;
use tracing::{debug, info};

use super::{albums_match, LibraryEntry, LibraryError, LibraryIndex};
use crate::track::TrackDescriptor;

/// Result of matching a playlist against the library.
///
/// Holds one entry per playlist track, in playlist order. `None` means no
/// acceptable library entry was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    entries: Vec<(TrackDescriptor, Option<LibraryEntry>)>,
}

impl MatchResult {
    /// All tracks with their library entry, in playlist order.
    pub fn entries(&self) -> &[(TrackDescriptor, Option<LibraryEntry>)] {
        &self.entries
    }

    /// Library entry for a track, if it was matched.
    pub fn get(&self, track: &TrackDescriptor) -> Option<&LibraryEntry> {
        self.entries
            .iter()
            .find(|(t, _)| t == track)
            .and_then(|(_, e)| e.as_ref())
    }

    /// Matched tracks with their entries, in playlist order.
    pub fn matched(&self) -> impl Iterator<Item = (&TrackDescriptor, &LibraryEntry)> {
        self.entries
            .iter()
            .filter_map(|(t, e)| e.as_ref().map(|e| (t, e)))
    }

    /// Tracks without a library entry, in playlist order.
    pub fn unmatched(&self) -> Vec<TrackDescriptor> {
        self.entries
            .iter()
            .filter(|(_, e)| e.is_none())
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.is_some()).count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.len() - self.matched_count()
    }
}

/// Match every playlist track against the library.
///
/// Each track is looked up exactly once, in order. With `strict`, an entry is
/// only accepted when its album equals the track's album (see
/// [`albums_match`]); this is re-checked here so strict matching never accepts
/// more than non-strict matching, whatever the index does.
pub fn match_playlist<I>(
    playlist: &[TrackDescriptor],
    index: &I,
    strict: bool,
) -> Result<MatchResult, LibraryError>
where
    I: LibraryIndex + ?Sized,
{
    let mut entries = Vec::with_capacity(playlist.len());

    for track in playlist {
        let entry = index
            .lookup(track, strict)?
            .filter(|e| !strict || albums_match(track.album.as_deref(), &e.album));

        match &entry {
            Some(e) => debug!(track = %track, path = %e.path, "Matched"),
            None => debug!(track = %track, "No library match"),
        }
        entries.push((track.clone(), entry));
    }

    let result = MatchResult { entries };
    info!(
        index = index.name(),
        tracks = result.len(),
        matched = result.matched_count(),
        unmatched = result.unmatched_count(),
        strict,
        "Matched playlist against library"
    );

    Ok(result)
}
