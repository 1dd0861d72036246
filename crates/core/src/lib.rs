pub mod acquire;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod library;
pub mod pipeline;
pub mod playlist;
pub mod searcher;
pub mod testing;
pub mod torrent_client;
pub mod track;

pub use acquire::{
    AcquisitionDispatcher, AcquisitionFailure, AcquisitionOutcome, AcquisitionReport, LocalSink,
    RemoteSink, SinkError, TorrentSink,
};
pub use budget::{check_budget, BudgetReport};
pub use catalog::{
    ApiKeySource, CatalogClient, CatalogError, GazelleClient, QualityPreference,
    ReleaseCandidate, StaticApiKey,
};
pub use config::{
    load_config, load_config_from_str, load_config_with_overrides, validate_config, Config,
    ConfigError, ConfigOverrides, SanitizedConfig,
};
pub use library::{match_playlist, BeetsLibrary, LibraryError, LibraryIndex, MatchResult};
pub use pipeline::{
    AcquisitionTarget, AssumeYes, Confirm, Pipeline, PipelineError, PipelineOptions,
    PipelineStop, PlaylistReport,
};
pub use playlist::{read_playlist, Playlist, PlaylistError};
pub use searcher::{SearchCoordinator, SearchOutcome, SearchReport};
pub use torrent_client::{QBittorrentConnector, RemoteSessionError};
pub use track::TrackDescriptor;
