//! Choosing one release and one torrent variant for a missing track.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::SearchConfig;
use crate::library::{albums_match, normalize};
use crate::track::TrackDescriptor;

use super::{ReleaseCandidate, ReleaseGroup, TorrentVariant};

/// Orders torrent variants; `Ordering::Less` means `a` is preferred over `b`.
///
/// Implementations must be total and deterministic.
pub trait VariantRanker: Send + Sync {
    fn compare(&self, a: &TorrentVariant, b: &TorrentVariant) -> Ordering;
}

impl<F> VariantRanker for F
where
    F: Fn(&TorrentVariant, &TorrentVariant) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &TorrentVariant, b: &TorrentVariant) -> Ordering {
        self(a, b)
    }
}

/// Ranks variants by a preferred encoding order, then by smaller size, then
/// by torrent id.
///
/// Encodings are compared case-insensitively; encodings not in the list rank
/// after all listed ones.
#[derive(Debug, Clone)]
pub struct QualityPreference {
    encodings: Vec<String>,
}

impl QualityPreference {
    pub fn new<I, S>(encodings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            encodings: encodings
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.preferred_encodings)
    }

    fn encoding_rank(&self, encoding: &str) -> usize {
        let encoding = encoding.trim().to_lowercase();
        self.encodings
            .iter()
            .position(|e| *e == encoding)
            .unwrap_or(self.encodings.len())
    }
}

impl Default for QualityPreference {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl VariantRanker for QualityPreference {
    fn compare(&self, a: &TorrentVariant, b: &TorrentVariant) -> Ordering {
        self.encoding_rank(&a.encoding)
            .cmp(&self.encoding_rank(&b.encoding))
            .then(a.size_bytes.cmp(&b.size_bytes))
            .then(a.torrent_id.cmp(&b.torrent_id))
    }
}

static CREDIT_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?:&|,|/|\s(?:and|feat\.?|ft\.?|featuring|vs\.?|with)\s)\s*")
        .expect("credit separator pattern is valid")
});

/// Split a normalized artist credit into the individual artists.
fn credited_artists(artist: &str) -> Vec<&str> {
    CREDIT_SEPARATOR
        .split(artist)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect()
}

/// Whether two artist credits name the same artist.
///
/// Equal after normalization, or one is a whole credited artist of the other
/// ("Daft Punk" matches "Daft Punk & Pharrell Williams", "Low" does not match
/// "Glow").
pub fn artists_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }

    a == b
        || credited_artists(&b).contains(&a.as_str())
        || credited_artists(&a).contains(&b.as_str())
}

/// Whether a release group is eligible for a track.
pub fn group_matches(track: &TrackDescriptor, group: &ReleaseGroup, restrict_album: bool) -> bool {
    if !artists_match(&track.artist, &group.artist) {
        return false;
    }

    !restrict_album
        || (track.album.is_some() && albums_match(track.album.as_deref(), &group.group_name))
}

/// Pick the release for a track from catalog results.
///
/// The first eligible group (in catalog relevance order) with at least one
/// variant wins; within it the ranker picks the variant.
pub fn select_candidate<R>(
    track: &TrackDescriptor,
    groups: &[ReleaseGroup],
    restrict_album: bool,
    ranker: &R,
) -> Option<ReleaseCandidate>
where
    R: VariantRanker + ?Sized,
{
    let group = groups
        .iter()
        .filter(|g| !g.variants.is_empty())
        .find(|g| group_matches(track, g, restrict_album))?;

    let variant = group
        .variants
        .iter()
        .min_by(|a, b| ranker.compare(a, b))?
        .clone();

    Some(ReleaseCandidate {
        artist: group.artist.clone(),
        group_name: group.group_name.clone(),
        variant,
    })
}
