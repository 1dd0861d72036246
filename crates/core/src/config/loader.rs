use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `REDLIST_CATALOG__API_KEY`.
const ENV_PREFIX: &str = "REDLIST_";

/// Values supplied on the command line, applied on top of file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub library_path: Option<PathBuf>,
    pub torrent_directory: Option<PathBuf>,
    pub restrict_album: Option<bool>,
    pub remote_enabled: Option<bool>,
    pub remote_host: Option<String>,
    pub remote_port: Option<u16>,
}

impl ConfigOverrides {
    fn apply(&self, mut figment: Figment) -> Figment {
        if let Some(path) = &self.library_path {
            figment = figment.merge(Serialized::default("library.path", path));
        }
        if let Some(dir) = &self.torrent_directory {
            figment = figment.merge(Serialized::default("torrent_directory", dir));
        }
        if let Some(restrict) = self.restrict_album {
            figment = figment.merge(Serialized::default("restrict_album", restrict));
        }
        if let Some(enabled) = self.remote_enabled {
            figment = figment.merge(Serialized::default("remote.enabled", enabled));
        }
        if let Some(host) = &self.remote_host {
            figment = figment.merge(Serialized::default("remote.host", host));
        }
        if let Some(port) = self.remote_port {
            figment = figment.merge(Serialized::default("remote.port", port));
        }
        figment
    }
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_overrides(Some(path), &ConfigOverrides::default())
}

/// Load configuration from an optional file, then the environment, then
/// command line overrides (last wins).
pub fn load_config_with_overrides(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
    figment = overrides.apply(figment);

    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizedConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[library]
path = "library.db"

[remote]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.remote.port, 9000);
    }

    #[test]
    fn test_load_config_from_str_invalid() {
        let toml = r#"
[remote]
port = "not a port"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/redlist.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
torrent_directory = "/downloads"

[library]
path = "/music/library.db"

[remote]
host = "127.0.0.1"
port = 3000
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.remote.port, 3000);
        assert_eq!(config.remote.host, "127.0.0.1");
        assert_eq!(config.torrent_directory.to_str().unwrap(), "/downloads");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
restrict_album = false

[library]
path = "/music/library.db"

[remote]
host = "seedbox"
"#
        )
        .unwrap();

        let overrides = ConfigOverrides {
            library_path: Some(PathBuf::from("/other/library.db")),
            restrict_album: Some(true),
            remote_enabled: Some(true),
            remote_port: Some(58846),
            ..Default::default()
        };

        let config = load_config_with_overrides(Some(temp_file.path()), &overrides).unwrap();
        assert_eq!(config.library.path.to_str().unwrap(), "/other/library.db");
        assert!(config.restrict_album);
        assert!(config.remote.enabled);
        assert_eq!(config.remote.host, "seedbox");
        assert_eq!(config.remote.port, 58846);
    }

    #[test]
    fn test_overrides_without_file() {
        let overrides = ConfigOverrides {
            library_path: Some(PathBuf::from("library.db")),
            ..Default::default()
        };

        let config = load_config_with_overrides(None, &overrides).unwrap();
        assert_eq!(config.library.path.to_str().unwrap(), "library.db");
        assert_eq!(config.catalog.max_results, 10);
    }

    #[test]
    fn test_defaults_load_without_file_or_library() {
        let config = load_config_with_overrides(None, &ConfigOverrides::default()).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.catalog.rate_limit_rpm, 60);
        assert!(!sanitized.catalog.api_key_configured);
        assert!(serde_json::to_string_pretty(&sanitized).is_ok());
    }
}
