//! beets library index backed by the beets SQLite database.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use tracing::debug;

use super::{albums_match, normalize, LibraryEntry, LibraryError, LibraryIndex};
use crate::track::TrackDescriptor;

/// Read-only view over the `items` table of a beets library.
pub struct BeetsLibrary {
    conn: Mutex<Connection>,
}

impl BeetsLibrary {
    /// Open a beets library database read-only.
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        if !path.exists() {
            return Err(LibraryError::OpenFailed {
                path: path.display().to_string(),
                reason: "file does not exist".to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| LibraryError::OpenFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Fail at startup rather than on the first lookup if this isn't a beets db.
        conn.prepare("SELECT id, title, artist, album, track, path FROM items LIMIT 1")
            .map_err(|e| LibraryError::OpenFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::from_connection(conn)
    }

    /// Wrap an existing connection (useful for testing).
    pub fn from_connection(conn: Connection) -> Result<Self, LibraryError> {
        register_normalize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn candidates(&self, track: &TrackDescriptor) -> Result<Vec<LibraryEntry>, LibraryError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LibraryError::Database(format!("Lock error: {}", e)))?;

        let mut stmt = conn
            .prepare_cached(
                "SELECT id, title, artist, album, track, path FROM items \
                 WHERE redlist_normalize(title) = ?1 AND redlist_normalize(artist) = ?2 \
                 ORDER BY id",
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![normalize(&track.title), normalize(&track.artist)],
                row_to_entry,
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| LibraryError::Database(e.to_string()))
    }
}

impl LibraryIndex for BeetsLibrary {
    fn name(&self) -> &str {
        "beets"
    }

    fn lookup(
        &self,
        track: &TrackDescriptor,
        strict: bool,
    ) -> Result<Option<LibraryEntry>, LibraryError> {
        let title = normalize(&track.title);
        let artist = normalize(&track.artist);

        let candidates = self.candidates(track)?;
        debug!(track = %track, rows = candidates.len(), "Library candidates");

        let best = candidates
            .into_iter()
            .filter(|e| normalize(&e.title) == title && normalize(&e.artist) == artist)
            .filter(|e| !strict || albums_match(track.album.as_deref(), &e.album))
            .min_by_key(|e| rank(track, e));

        Ok(best)
    }
}

/// Lower is better: same album first, then same position, then oldest item.
fn rank(track: &TrackDescriptor, entry: &LibraryEntry) -> (bool, bool, i64) {
    let same_album = track.album.is_some() && albums_match(track.album.as_deref(), &entry.album);
    let same_position = track.position.map(|p| p == entry.track).unwrap_or(false);
    (!same_album, !same_position, entry.id)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LibraryEntry> {
    // beets stores paths as BLOBs; older databases may have TEXT.
    let path = match row.get_ref(5)? {
        ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => String::new(),
    };

    Ok(LibraryEntry {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        artist: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        album: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        track: row.get::<_, Option<i64>>(4)?.unwrap_or(0).max(0) as u32,
        path,
    })
}

/// Make [`normalize`] callable from SQL as `redlist_normalize`.
///
/// SQLite's `LIKE` and `lower()` only fold ASCII.
fn register_normalize(conn: &Connection) -> Result<(), LibraryError> {
    conn.create_scalar_function(
        "redlist_normalize",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = match ctx.get_raw(0) {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    Some(normalize(&String::from_utf8_lossy(bytes)))
                }
                _ => None,
            };
            Ok(text)
        },
    )
    .map_err(|e| LibraryError::Database(e.to_string()))
}
