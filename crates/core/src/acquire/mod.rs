//! Acquisition of selected releases.
//!
//! The [`AcquisitionDispatcher`] fetches each selected release's torrent
//! file and hands it to a [`TorrentSink`]: either a local directory or a
//! remote download-client session.

mod dispatcher;
mod local;
mod remote;
mod types;

pub use dispatcher::AcquisitionDispatcher;
pub use local::LocalSink;
pub use remote::RemoteSink;
pub use types::*;
