//! qBittorrent Web API remote session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;

use super::{RemoteConnector, RemoteSession, RemoteSessionError};

/// A logged-in qBittorrent Web API session.
pub struct QBittorrentSession {
    client: Client,
    config: RemoteConfig,
    base_url: String,
    closed: AtomicBool,
}

impl QBittorrentSession {
    /// Connect and log in.
    pub async fn open(config: RemoteConfig) -> Result<Self, RemoteSessionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| RemoteSessionError::ConnectionFailed(e.to_string()))?;

        let session = Self {
            client,
            base_url: config.base_url(),
            config,
            closed: AtomicBool::new(false),
        };
        session.login().await?;
        info!(url = %session.base_url, "Connected to qBittorrent");
        Ok(session)
    }

    /// Login and store session cookie.
    async fn login(&self) -> Result<(), RemoteSessionError> {
        let url = format!("{}/api/v2/auth/login", self.base_url);

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .header("Referer", &self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(RemoteSessionError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(RemoteSessionError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    fn torrent_form(
        filename: &str,
        data: &[u8],
        start_paused: bool,
    ) -> Result<multipart::Form, RemoteSessionError> {
        let file_part = multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/x-bittorrent")
            .map_err(|e| RemoteSessionError::InvalidTorrent(e.to_string()))?;

        let paused = if start_paused { "true" } else { "false" };
        // qBittorrent 5 renamed `paused` to `stopped`; send both.
        Ok(multipart::Form::new()
            .part("torrents", file_part)
            .text("paused", paused)
            .text("stopped", paused))
    }

    async fn post_torrent(
        &self,
        filename: &str,
        data: &[u8],
        start_paused: bool,
    ) -> Result<Response, RemoteSessionError> {
        let url = format!("{}/api/v2/torrents/add", self.base_url);
        self.client
            .post(&url)
            .multipart(Self::torrent_form(filename, data, start_paused)?)
            .send()
            .await
            .map_err(map_transport_error)
    }
}

#[async_trait]
impl RemoteSession for QBittorrentSession {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn submit(
        &self,
        filename: &str,
        data: &[u8],
        start_paused: bool,
    ) -> Result<(), RemoteSessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RemoteSessionError::Closed);
        }

        let mut response = self.post_torrent(filename, data, start_paused).await?;

        if response.status().as_u16() == 403 {
            // Session expired, retry after login
            warn!("qBittorrent session expired, re-authenticating");
            self.login().await?;
            response = self.post_torrent(filename, data, start_paused).await?;
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 415 {
            return Err(RemoteSessionError::InvalidTorrent(body));
        }
        if !status.is_success() {
            return Err(RemoteSessionError::ApiError(format!("HTTP {}", status)));
        }
        if body.contains("Fails.") {
            return Err(RemoteSessionError::Rejected(format!(
                "{} was not added",
                filename
            )));
        }

        debug!(filename, paused = start_paused, "Submitted torrent to qBittorrent");
        Ok(())
    }

    async fn close(&self) -> Result<(), RemoteSessionError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let url = format!("{}/api/v2/auth/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(RemoteSessionError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        debug!("qBittorrent session closed");
        Ok(())
    }
}

/// Opens [`QBittorrentSession`]s from configuration.
pub struct QBittorrentConnector {
    config: RemoteConfig,
}

impl QBittorrentConnector {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RemoteConnector for QBittorrentConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteSession>, RemoteSessionError> {
        let session = QBittorrentSession::open(self.config.clone()).await?;
        Ok(Arc::new(session))
    }
}

fn map_transport_error(e: reqwest::Error) -> RemoteSessionError {
    if e.is_timeout() {
        RemoteSessionError::Timeout
    } else if e.is_connect() {
        RemoteSessionError::ConnectionFailed(e.to_string())
    } else {
        RemoteSessionError::ApiError(e.to_string())
    }
}
