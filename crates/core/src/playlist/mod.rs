//! Playlist files.
//!
//! Two input formats are accepted: a JSON document
//! `{"title": ..., "tracks": [{"title", "artist", "album"?, "position"?}]}`
//! and a plain-text list with one `Artist - Title` or
//! `Artist - Title - Album` per line, titled after the file stem.

mod m3u;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::track::TrackDescriptor;

pub use m3u::{m3u_path, write_m3u};

/// Errors reading or writing playlist files.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Failed to read playlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON playlist: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Line {line}: expected 'Artist - Title', got {content:?}")]
    InvalidLine { line: usize, content: String },

    #[error("Playlist has no tracks")]
    Empty,

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parsed playlist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Playlist {
    pub title: String,
    pub tracks: Vec<TrackDescriptor>,
}

/// Read a playlist file, choosing the format from its contents.
pub fn read_playlist(path: &Path) -> Result<Playlist, PlaylistError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PlaylistError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let playlist = if contents.trim_start().starts_with('{') {
        parse_json(&contents)?
    } else {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playlist".to_string());
        parse_text(&title, &contents)?
    };

    if playlist.tracks.is_empty() {
        return Err(PlaylistError::Empty);
    }
    Ok(playlist)
}

/// Parse the JSON playlist format.
pub fn parse_json(contents: &str) -> Result<Playlist, PlaylistError> {
    Ok(serde_json::from_str(contents)?)
}

/// Parse the plain-text format. Blank lines and `#` comments are skipped.
pub fn parse_text(title: &str, contents: &str) -> Result<Playlist, PlaylistError> {
    let mut tracks = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.splitn(3, " - ").map(str::trim).collect();
        let track = match parts.as_slice() {
            [artist, title] if !artist.is_empty() && !title.is_empty() => {
                TrackDescriptor::new(*artist, *title)
            }
            [artist, title, album] if !artist.is_empty() && !title.is_empty() => {
                let track = TrackDescriptor::new(*artist, *title);
                if album.is_empty() {
                    track
                } else {
                    track.with_album(*album)
                }
            }
            _ => {
                return Err(PlaylistError::InvalidLine {
                    line: index + 1,
                    content: line.to_string(),
                })
            }
        };
        tracks.push(track);
    }

    Ok(Playlist {
        title: title.to_string(),
        tracks,
    })
}
