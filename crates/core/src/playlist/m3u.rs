//! Extended M3U export of matched library entries.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::library::MatchResult;

use super::PlaylistError;

/// Where the M3U for a playlist titled `title` goes inside `directory`.
pub fn m3u_path(directory: &Path, title: &str) -> PathBuf {
    let name: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    directory.join(format!("{}.m3u", name.trim()))
}

fn render(result: &MatchResult) -> String {
    let mut out = String::from("#EXTM3U\n");
    for (_, entry) in result.matched() {
        let _ = writeln!(out, "#EXTINF:-1,{} - {}", entry.artist, entry.title);
        let _ = writeln!(out, "{}", entry.path);
    }
    out
}

/// Write the matched entries of `result` to `path`, in playlist order.
///
/// Unmatched tracks are left out. An existing file is replaced.
pub fn write_m3u(result: &MatchResult, path: &Path) -> Result<(), PlaylistError> {
    std::fs::write(path, render(result)).map_err(|source| PlaylistError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), tracks = result.matched_count(), "Wrote M3U playlist");
    Ok(())
}
