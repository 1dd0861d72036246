//! Local music library lookup.
//!
//! This module provides a `LibraryIndex` trait for resolving playlist tracks
//! against the user's library, a beets-backed implementation, and the
//! matcher that partitions a playlist into matched and unmatched tracks.

mod beets;
mod matcher;

pub use beets::BeetsLibrary;
pub use matcher::{match_playlist, MatchResult};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::TrackDescriptor;

/// Errors that can occur when querying the library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to open library at {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Library query failed: {0}")]
    Database(String),
}

/// An item in the local library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Track number, 0 when unknown.
    pub track: u32,
    /// Path of the audio file on disk.
    pub path: String,
}

/// Trait for library backends.
///
/// Lookups must be idempotent within a run: the same descriptor and
/// strictness always yield the same entry.
pub trait LibraryIndex: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Find the best entry for a track, or `None` when nothing acceptable exists.
    ///
    /// With `strict`, only entries from the descriptor's album qualify.
    fn lookup(
        &self,
        track: &TrackDescriptor,
        strict: bool,
    ) -> Result<Option<LibraryEntry>, LibraryError>;
}

static FEATURING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[\(\[]\s*(feat\.?|ft\.?|featuring|with)\s[^\)\]]*[\)\]]")
        .expect("featuring pattern is valid")
});

static TRAILING_FEATURING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(feat\.?|ft\.?|featuring)\s.*$").expect("featuring pattern is valid")
});

static VERSION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\s+-\s+(\d{4}\s+)?",
        r"(remaster(ed)?|single version|radio edit|album version|mono|stereo)\b.*$"
    ))
    .expect("version pattern is valid")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Normalize a title or artist name for comparison.
///
/// Lowercases, collapses whitespace and drops featured-artist credits and
/// remaster/edit suffixes.
pub fn normalize(text: &str) -> String {
    let text = FEATURING.replace_all(text, "");
    let text = TRAILING_FEATURING.replace(&text, "");
    let text = VERSION_SUFFIX.replace(&text, "");
    WHITESPACE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Album equality used by strict matching: case-insensitive on trimmed text.
///
/// A track without an album only matches entries whose album is empty.
pub fn albums_match(track_album: Option<&str>, entry_album: &str) -> bool {
    let entry_album = entry_album.trim().to_lowercase();
    match track_album {
        Some(album) => album.trim().to_lowercase() == entry_album,
        None => entry_album.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize("  Love   Will Tear  Us Apart "), "love will tear us apart");
    }

    #[test]
    fn test_normalize_strips_featuring() {
        assert_eq!(normalize("Get Lucky (feat. Pharrell Williams)"), "get lucky");
        assert_eq!(normalize("Get Lucky [ft. Pharrell]"), "get lucky");
        assert_eq!(normalize("Daft Punk feat. Pharrell Williams"), "daft punk");
    }

    #[test]
    fn test_normalize_strips_version_suffix() {
        assert_eq!(normalize("Heroes - 2017 Remaster"), "heroes");
        assert_eq!(normalize("Heroes - Remastered 1999"), "heroes");
        assert_eq!(normalize("Heroes - Single Version"), "heroes");
    }

    #[test]
    fn test_normalize_keeps_regular_dashes() {
        assert_eq!(normalize("Part 1 - The Beginning"), "part 1 - the beginning");
    }

    #[test]
    fn test_albums_match() {
        assert!(albums_match(Some("Unknown Pleasures"), "unknown pleasures"));
        assert!(albums_match(Some(" Closer "), "Closer"));
        assert!(!albums_match(Some("Closer"), "Still"));
        assert!(albums_match(None, ""));
        assert!(!albums_match(None, "Closer"));
    }
}
