//! Concurrent catalog search for tracks missing from the library.
//!
//! The `SearchCoordinator` fans out one catalog search per unmatched track,
//! reduces each result to at most one release, and aggregates the outcomes
//! keyed by track.

mod coordinator;
mod types;

pub use coordinator::SearchCoordinator;
pub use types::*;
