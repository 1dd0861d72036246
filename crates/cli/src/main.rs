mod prompt;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redlist_core::acquire::AcquisitionOutcome;
use redlist_core::{
    load_config_with_overrides, validate_config, AcquisitionTarget, AssumeYes, BeetsLibrary,
    CatalogClient, Config, ConfigOverrides, Confirm, GazelleClient, Pipeline, PipelineOptions,
    PipelineStop, PlaylistReport, QBittorrentConnector, QualityPreference, SanitizedConfig,
    StaticApiKey,
};

use prompt::{ApiKeyPrompt, TerminalPrompter};

/// Config file used when neither --config nor REDLIST_CONFIG is given.
const DEFAULT_CONFIG_FILE: &str = "redlist.toml";

/// Match playlists against a beets library and fetch what is missing.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Playlist files (JSON or `Artist - Title` lines)
    #[arg(required_unless_present = "show_config")]
    playlists: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long, env = "REDLIST_CONFIG")]
    config: Option<PathBuf>,

    /// beets library database
    #[arg(long)]
    library: Option<PathBuf>,

    /// Directory to save .torrent files to
    #[arg(long)]
    downloads: Option<PathBuf>,

    /// Answer yes to every question
    #[arg(short, long)]
    yes: bool,

    /// Only accept library matches from the playlist track's album
    #[arg(long)]
    restrict_album: bool,

    /// Send torrents to the remote qBittorrent client
    #[arg(long)]
    remote: bool,

    /// Remote client host
    #[arg(long)]
    remote_host: Option<String>,

    /// Remote client port
    #[arg(long)]
    remote_port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            library_path: self.library.clone(),
            torrent_directory: self.downloads.clone(),
            restrict_album: self.restrict_album.then_some(true),
            remote_enabled: self.remote.then_some(true),
            remote_host: self.remote_host.clone(),
            remote_port: self.remote_port,
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        })
    }
}

#[tokio::main]
async fn main() {
    match run(Cli::parse()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every playlist was processed without error.
async fn run(cli: Cli) -> Result<bool> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config_path();
    if let Some(path) = &config_path {
        info!("Loading configuration from {:?}", path);
    }
    let config = load_config_with_overrides(config_path.as_deref(), &cli.overrides())
        .context("Failed to load configuration")?;

    if cli.show_config {
        println!("{}", render_config(&config)?);
        return Ok(true);
    }

    validate_config(&config).context("Configuration validation failed")?;

    let pipeline = build_pipeline(&config, cli.yes)?;

    let mut failed = 0usize;
    for path in &cli.playlists {
        if !process_playlist(&pipeline, path).await {
            failed += 1;
        }
    }

    if failed > 0 {
        warn!(failed, total = cli.playlists.len(), "Some playlists failed");
    }
    Ok(failed == 0)
}

/// The effective configuration as JSON, secrets redacted.
fn render_config(config: &Config) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SanitizedConfig::from(config))?)
}

fn build_pipeline(config: &Config, assume_yes: bool) -> Result<Pipeline> {
    let library = BeetsLibrary::open(&config.library.path).with_context(|| {
        format!("Failed to open beets library at {:?}", config.library.path)
    })?;
    info!("Library: {:?}", config.library.path);

    let key_source: Box<dyn redlist_core::ApiKeySource> = match &config.catalog.api_key {
        Some(key) => Box::new(StaticApiKey::new(Some(key.clone()))),
        None => Box::new(ApiKeyPrompt),
    };
    let catalog: Arc<dyn CatalogClient> = Arc::new(
        GazelleClient::new(config.catalog.clone(), key_source)
            .context("Failed to create catalog client")?,
    );
    info!("Catalog: {}", config.catalog.url);

    let target = if config.remote.enabled {
        info!("Sending torrents to {}", config.remote.base_url());
        AcquisitionTarget::Remote(Arc::new(QBittorrentConnector::new(config.remote.clone())))
    } else {
        info!("Saving torrents to {:?}", config.torrent_directory);
        AcquisitionTarget::Directory(config.torrent_directory.clone())
    };

    let confirm: Arc<dyn Confirm> = if assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalPrompter)
    };

    Ok(Pipeline::new(
        PipelineOptions::from_config(config),
        Arc::new(library),
        catalog,
        Arc::new(QualityPreference::from_config(&config.search)),
        target,
        confirm,
        config.m3u_directory.clone(),
    ))
}

/// Run one playlist, logging instead of propagating its failure.
async fn process_playlist(pipeline: &Pipeline, path: &Path) -> bool {
    match pipeline.run_file(path).await {
        Ok(report) => {
            print_summary(&report);
            true
        }
        Err(e) => {
            error!(playlist = %path.display(), error = %e, "Failed to process playlist");
            false
        }
    }
}

fn print_summary(report: &PlaylistReport) {
    println!(
        "\n{}: {}/{} tracks in library, playlist written to {}",
        report.title,
        report.matches.matched_count(),
        report.matches.len(),
        report.m3u_path.display()
    );

    match report.stop {
        PipelineStop::AllMatched => println!("Nothing missing."),
        PipelineStop::Declined => println!("Stopped."),
        PipelineStop::AuthCancelled => println!("Search cancelled."),
        PipelineStop::NothingFound => println!("No releases found for the missing tracks."),
        PipelineStop::Completed => {}
    }

    if let Some(acquisition) = &report.acquisition {
        for (release, outcome) in &acquisition.outcomes {
            match outcome {
                AcquisitionOutcome::Success { filename, .. } => {
                    println!("Acquired {} ({})", release, filename)
                }
                AcquisitionOutcome::Failure(reason) => {
                    println!("Failed {}: {}", release, reason)
                }
            }
        }
        println!(
            "{} acquired, {} failed.",
            acquisition.success_count(),
            acquisition.failure_count()
        );
    }
}
