use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Required before running; left empty so the defaults can be shown.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Directory M3U playlists of matched tracks are written to.
    #[serde(default = "default_dir")]
    pub m3u_directory: PathBuf,
    /// Directory fetched .torrent files are saved to when not using a remote client.
    #[serde(default = "default_dir")]
    pub torrent_directory: PathBuf,
    /// Only accept library matches from the same album.
    #[serde(default)]
    pub restrict_album: bool,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Local music library configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Path to the beets library database.
    pub path: PathBuf,
}

/// Catalog search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Only consider releases whose name matches the track's album.
    #[serde(default)]
    pub restrict_album: bool,
    /// Encodings in order of preference, best first.
    #[serde(default = "default_preferred_encodings")]
    pub preferred_encodings: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            restrict_album: false,
            preferred_encodings: default_preferred_encodings(),
        }
    }
}

fn default_preferred_encodings() -> Vec<String> {
    [
        "24bit Lossless",
        "Lossless",
        "320",
        "V0 (VBR)",
        "V2 (VBR)",
        "256",
        "192",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Gazelle catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Tracker base URL (e.g., "https://redacted.sh")
    #[serde(default = "default_catalog_url")]
    pub url: String,
    /// API key. Prompted for when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Max API requests per minute (default: 60)
    #[serde(default = "default_rate_limit_rpm")]
    pub rate_limit_rpm: u32,
    /// Max release groups considered per search (default: 10)
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            rate_limit_rpm: default_rate_limit_rpm(),
            max_results: default_max_results(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://redacted.sh".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_rate_limit_rpm() -> u32 {
    60
}

fn default_max_results() -> u32 {
    10
}

/// Remote download client (qBittorrent Web API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Hand torrents to the remote client instead of saving them locally.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_remote_host")]
    pub host: String,
    #[serde(default = "default_remote_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Add torrents in the paused state.
    #[serde(default)]
    pub add_paused: bool,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_remote_host(),
            port: default_remote_port(),
            username: String::new(),
            password: String::new(),
            add_paused: false,
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Base URL of the Web API.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

fn default_remote_host() -> String {
    "localhost".to_string()
}

fn default_remote_port() -> u16 {
    8080
}

/// Acquisition budget configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetConfig {
    /// Bytes available for new downloads. When unset the catalog account's
    /// download buffer is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_bytes: Option<u64>,
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub library: LibraryConfig,
    pub m3u_directory: PathBuf,
    pub torrent_directory: PathBuf,
    pub restrict_album: bool,
    pub search: SearchConfig,
    pub catalog: SanitizedCatalogConfig,
    pub remote: SanitizedRemoteConfig,
    pub budget: BudgetConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub rate_limit_rpm: u32,
    pub max_results: u32,
}

/// Sanitized remote config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password_configured: bool,
    pub add_paused: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            library: config.library.clone(),
            m3u_directory: config.m3u_directory.clone(),
            torrent_directory: config.torrent_directory.clone(),
            restrict_album: config.restrict_album,
            search: config.search.clone(),
            catalog: SanitizedCatalogConfig {
                url: config.catalog.url.clone(),
                api_key_configured: config
                    .catalog
                    .api_key
                    .as_ref()
                    .map(|k| !k.is_empty())
                    .unwrap_or(false),
                timeout_secs: config.catalog.timeout_secs,
                rate_limit_rpm: config.catalog.rate_limit_rpm,
                max_results: config.catalog.max_results,
            },
            remote: SanitizedRemoteConfig {
                enabled: config.remote.enabled,
                host: config.remote.host.clone(),
                port: config.remote.port,
                username: config.remote.username.clone(),
                password_configured: !config.remote.password.is_empty(),
                add_paused: config.remote.add_paused,
                timeout_secs: config.remote.timeout_secs,
            },
            budget: config.budget.clone(),
        }
    }
}
