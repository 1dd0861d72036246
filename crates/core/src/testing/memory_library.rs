//! In-memory library index for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::library::{albums_match, normalize, LibraryEntry, LibraryError, LibraryIndex};
use crate::track::TrackDescriptor;

/// Library index over a fixed list of entries.
///
/// Matches on normalized artist and title like the beets index does, and
/// picks the lowest id among equally good entries.
#[derive(Debug)]
pub struct MemoryLibrary {
    entries: Vec<LibraryEntry>,
    /// When set, the strict flag is ignored by lookups.
    ignore_strictness: bool,
    lookups: AtomicUsize,
    /// If set, every lookup fails with this message.
    failure: Mutex<Option<String>>,
}

impl MemoryLibrary {
    pub fn new(entries: Vec<LibraryEntry>) -> Self {
        Self {
            entries,
            ignore_strictness: false,
            lookups: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Behave like an index that does not implement strict matching.
    pub fn ignoring_strictness(mut self) -> Self {
        self.ignore_strictness = true;
        self
    }

    /// Make every subsequent lookup fail.
    pub fn fail_lookups(&self, message: &str) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.to_string());
        }
    }

    /// Number of lookups performed so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LibraryIndex for MemoryLibrary {
    fn name(&self) -> &str {
        "memory"
    }

    fn lookup(
        &self,
        track: &TrackDescriptor,
        strict: bool,
    ) -> Result<Option<LibraryEntry>, LibraryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(LibraryError::Database(message));
        }

        let title = normalize(&track.title);
        let artist = normalize(&track.artist);
        let strict = strict && !self.ignore_strictness;

        Ok(self
            .entries
            .iter()
            .filter(|e| normalize(&e.title) == title && normalize(&e.artist) == artist)
            .filter(|e| !strict || albums_match(track.album.as_deref(), &e.album))
            .min_by_key(|e| e.id)
            .cloned())
    }
}
