//! Gazelle JSON API catalog implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::track::TrackDescriptor;

use super::rate_limiter::RateLimiter;
use super::{
    ApiKeySource, CatalogClient, CatalogError, ReleaseGroup, TorrentPayload, TorrentVariant,
};

/// Gazelle catalog client.
///
/// The API key is obtained lazily from an [`ApiKeySource`] on first use so
/// the user is only asked for it once they decide to search.
pub struct GazelleClient {
    client: Client,
    config: CatalogConfig,
    key_source: Box<dyn ApiKeySource>,
    api_key: RwLock<Option<String>>,
    rate_limiter: RateLimiter,
}

impl GazelleClient {
    /// Create a new client with the given configuration.
    pub fn new(
        config: CatalogConfig,
        key_source: Box<dyn ApiKeySource>,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(concat!("redlist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;

        let rate_limiter = RateLimiter::new(config.rate_limit_rpm);

        Ok(Self {
            client,
            config,
            key_source,
            api_key: RwLock::new(None),
            rate_limiter,
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Build an `ajax.php` URL with encoded query parameters.
    fn build_url(&self, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/ajax.php?{}", self.base_url(), query)
    }

    /// Get the API key, asking the key source the first time.
    async fn api_key(&self) -> Result<String, CatalogError> {
        if let Some(key) = self.api_key.read().await.as_ref() {
            return Ok(key.clone());
        }

        let mut slot = self.api_key.write().await;
        if let Some(key) = slot.as_ref() {
            return Ok(key.clone());
        }

        match self.key_source.api_key() {
            Some(key) if !key.trim().is_empty() => {
                let key = key.trim().to_string();
                *slot = Some(key.clone());
                Ok(key)
            }
            _ => Err(CatalogError::AuthCancelled),
        }
    }

    /// Send a rate-limited, authenticated GET request.
    async fn send(&self, params: &[(&str, String)]) -> Result<Response, CatalogError> {
        let key = self.api_key().await?;
        self.rate_limiter.acquire().await;

        let url = self.build_url(params);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, key)
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => Ok(response),
            status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                // A rejected key is asked for again on the next request.
                self.api_key.write().await.take();
                warn!(status = %status, "Catalog rejected the API key");
                Err(CatalogError::AuthenticationFailed(format!("HTTP {}", status)))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(CatalogError::ApiError(format!(
                    "HTTP {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                )))
            }
        }
    }

    /// Send a request and unwrap the Gazelle `{status, response}` envelope.
    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let body = self
            .send(params)
            .await?
            .text()
            .await
            .map_err(map_transport_error)?;
        parse_envelope(&body)
    }
}

#[async_trait]
impl CatalogClient for GazelleClient {
    fn name(&self) -> &str {
        "gazelle"
    }

    async fn authenticate(&self) -> Result<(), CatalogError> {
        let index: IndexResponse = self.get_json(&[("action", "index".to_string())]).await?;
        info!(user = %index.username, "Authenticated with catalog");
        Ok(())
    }

    async fn search(
        &self,
        track: &TrackDescriptor,
        restrict_album: bool,
    ) -> Result<Vec<ReleaseGroup>, CatalogError> {
        let mut params = vec![
            ("action", "browse".to_string()),
            ("artistname", track.artist.clone()),
            ("filelist", track.title.clone()),
        ];
        if restrict_album {
            if let Some(album) = &track.album {
                params.push(("groupname", album.clone()));
            }
        }

        let browse: BrowseResponse = self.get_json(&params).await?;
        let groups: Vec<ReleaseGroup> = browse
            .results
            .into_iter()
            .take(self.config.max_results as usize)
            .map(BrowseGroup::into_release_group)
            .collect();

        debug!(track = %track, groups = groups.len(), "Catalog search complete");
        Ok(groups)
    }

    async fn fetch_torrent(&self, torrent_id: u64) -> Result<TorrentPayload, CatalogError> {
        let response = self
            .send(&[
                ("action", "download".to_string()),
                ("id", torrent_id.to_string()),
            ])
            .await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("json"))
            .unwrap_or(false);

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("{}.torrent", torrent_id));

        let data = response.bytes().await.map_err(map_transport_error)?.to_vec();

        if is_json {
            // Gazelle reports download errors as a JSON envelope.
            let body = String::from_utf8_lossy(&data);
            return Err(parse_envelope::<serde_json::Value>(&body)
                .err()
                .unwrap_or_else(|| {
                    CatalogError::ApiError("Expected torrent file, got JSON".to_string())
                }));
        }

        debug!(torrent_id, filename = %filename, bytes = data.len(), "Fetched torrent");
        Ok(TorrentPayload { filename, data })
    }

    async fn download_buffer(&self) -> Result<u64, CatalogError> {
        let index: IndexResponse = self.get_json(&[("action", "index".to_string())]).await?;
        Ok(index
            .userstats
            .uploaded
            .saturating_sub(index.userstats.downloaded))
    }
}

fn map_transport_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout
    } else if e.is_connect() {
        CatalogError::ConnectionFailed(e.to_string())
    } else {
        CatalogError::ApiError(e.to_string())
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| CatalogError::ParseError(e.to_string()))?;

    if envelope.status != "success" {
        let message = envelope
            .error
            .unwrap_or_else(|| format!("status {}", envelope.status));
        return Err(CatalogError::ApiError(message));
    }

    let response = envelope
        .response
        .ok_or_else(|| CatalogError::ParseError("missing response".to_string()))?;
    serde_json::from_value(response).map_err(|e| CatalogError::ParseError(e.to_string()))
}

/// Extract the filename from a `Content-Disposition` header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Decode the handful of HTML entities Gazelle leaves in names.
fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// Gazelle API response types
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    response: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    username: String,
    userstats: UserStats,
}

#[derive(Debug, Deserialize)]
struct UserStats {
    #[serde(default)]
    uploaded: u64,
    #[serde(default)]
    downloaded: u64,
}

#[derive(Debug, Deserialize)]
struct BrowseResponse {
    #[serde(default)]
    results: Vec<BrowseGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseGroup {
    group_id: u64,
    group_name: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    group_year: Option<u32>,
    #[serde(default)]
    torrents: Vec<BrowseTorrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseTorrent {
    torrent_id: u64,
    #[serde(default)]
    media: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    encoding: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    seeders: u32,
}

impl BrowseGroup {
    fn into_release_group(self) -> ReleaseGroup {
        ReleaseGroup {
            group_id: self.group_id,
            artist: unescape_html(&self.artist),
            group_name: unescape_html(&self.group_name),
            year: self.group_year.filter(|y| *y > 0),
            variants: self
                .torrents
                .into_iter()
                .map(|t| TorrentVariant {
                    torrent_id: t.torrent_id,
                    media: t.media,
                    format: t.format,
                    encoding: t.encoding,
                    size_bytes: t.size,
                    seeders: t.seeders,
                })
                .collect(),
        }
    }
}
