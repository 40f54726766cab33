use crate::server::{
    ChannelsRequest, InputRequest, RESOLVE_CHANNEL_PATH, RESOLVE_VIDEO_PATH, VIDEOS_PATH,
};
use async_trait::async_trait;
use rotator_core::{CatalogClient, ContentItem, CoreError, RecentItems, ResolvedChannel};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

const LOG_TARGET: &str = "rotator::proxy::client";

/// Shown when `/api/resolve-channel` fails without a message
pub const CHANNEL_FALLBACK_MESSAGE: &str = "Could not identify the channel.";
/// Shown when `/api/resolve-video` fails without a message
pub const VIDEO_FALLBACK_MESSAGE: &str = "Could not add the video.";
/// Shown for any failure of `/api/videos`
pub const VIDEOS_FAILED_MESSAGE: &str = "Could not fetch videos right now.";

/// Request timeout; a catalog fetch fans out to one upstream call per channel
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Catalog backed by a running `rotator-proxy`
pub struct ProxyCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyCatalog {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Rotator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
    }
}

/// Turn a non-2xx resolve response into a user-facing error, preferring the
/// text body the proxy sent.
async fn resolution_error(response: reqwest::Response, fallback: &str) -> CoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    warn!(target: LOG_TARGET, "Proxy answered {}: {}", status, text);

    if text.trim().is_empty() {
        CoreError::resolution(fallback)
    } else {
        CoreError::resolution(text)
    }
}

#[async_trait]
impl CatalogClient for ProxyCatalog {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn resolve_channel(&self, raw: &str) -> Result<ResolvedChannel, CoreError> {
        let request = InputRequest {
            input: raw.to_string(),
        };
        let response = self.post(RESOLVE_CHANNEL_PATH, &request).await?;
        if !response.status().is_success() {
            return Err(resolution_error(response, CHANNEL_FALLBACK_MESSAGE).await);
        }
        Ok(response.json().await?)
    }

    async fn resolve_video(&self, raw: &str) -> Result<ContentItem, CoreError> {
        let request = InputRequest {
            input: raw.to_string(),
        };
        let response = self.post(RESOLVE_VIDEO_PATH, &request).await?;
        if !response.status().is_success() {
            return Err(resolution_error(response, VIDEO_FALLBACK_MESSAGE).await);
        }
        Ok(response.json().await?)
    }

    async fn fetch_recent_items(&self, channel_ids: &[String]) -> Result<RecentItems, CoreError> {
        let request = ChannelsRequest {
            channels: channel_ids.to_vec(),
        };
        let failed = |cause: &dyn std::fmt::Display| {
            warn!(target: LOG_TARGET, "Video fetch through proxy failed: {}", cause);
            CoreError::CatalogFailed {
                reason: VIDEOS_FAILED_MESSAGE.into(),
            }
        };

        let response = self
            .post(VIDEOS_PATH, &request)
            .await
            .map_err(|e| failed(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(&status));
        }
        response.json().await.map_err(|e| failed(&e))
    }
}
