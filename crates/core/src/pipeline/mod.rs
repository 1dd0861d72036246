//! End-to-end processing of one playlist.
//!
//! The [`Pipeline`] matches a playlist against the library, exports the
//! matched part as M3U, searches the catalog for the rest, checks the
//! selection against the download budget and acquires it. Every stage that
//! commits to more work asks the [`Confirm`] collaborator first.

mod confirm;
mod runner;
mod types;

pub use confirm::{AssumeYes, Confirm};
pub use runner::{AcquisitionTarget, Pipeline};
pub use types::{PipelineError, PipelineOptions, PipelineStop, PlaylistReport};
