//! Remote download-client sessions.
//!
//! A [`RemoteSession`] is opened once per pipeline run, receives every
//! selected torrent, and is closed on every exit path by [`with_session`].

mod qbittorrent;
mod session;
mod types;

pub use qbittorrent::{QBittorrentConnector, QBittorrentSession};
pub use session::with_session;
pub use types::*;
