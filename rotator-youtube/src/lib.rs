mod api;

use api::{ListResponse, Resource, SearchResult};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rotator_core::{
    extract_video_id, parse_channel_input, CatalogClient, CatalogConfig, ChannelQuery,
    ContentItem, CoreError, ItemsByChannel, RecentItems, ResolvedChannel,
};
use serde::de::DeserializeOwned;
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use api::{UNKNOWN_CHANNEL, UNTITLED_VIDEO};

const LOG_TARGET: &str = "rotator::youtube";

pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default timeout for HTTP requests (10 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default number of recent videos per channel
const DEFAULT_MAX_RESULTS: u32 = 10;

/// YouTube Data API v3 catalog
pub struct YouTubeCatalog {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    max_results: u32,
}

impl YouTubeCatalog {
    /// Create a catalog with default 10-second timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CoreError> {
        Self::build(
            api_key.into(),
            YOUTUBE_API_URL.to_string(),
            DEFAULT_MAX_RESULTS,
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_MAX_RETRIES,
        )
    }

    /// Create a catalog from the `[catalog]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigMissingField`] when no API key is configured,
    /// or an error if the HTTP client cannot be created.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CoreError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| CoreError::ConfigMissingField {
                field: "catalog.api_key".into(),
            })?;
        Self::build(
            api_key,
            config.base_url.clone(),
            config.max_results,
            config.timeout_secs,
            config.max_retries,
        )
    }

    fn build(
        api_key: String,
        base_url: String,
        max_results: u32,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self, CoreError> {
        // Base client with timeout
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Rotator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results,
        })
    }

    /// Point the catalog at another API root (e.g. a test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// GET `<base>/<resource>?<params>&key=<api key>` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let mut query = String::new();
        for (name, value) in params {
            let _ = write!(query, "{name}={}&", urlencoding::encode(value));
        }
        // Logged before the key is appended
        debug!(target: LOG_TARGET, "GET /{}?{}", resource, query.trim_end_matches('&'));
        let _ = write!(query, "key={}", urlencoding::encode(&self.api_key));

        let url = format!("{}/{resource}?{query}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(target: LOG_TARGET, "YouTube returned status {} for /{}", response.status(), resource);
            return Err(CoreError::CatalogStatus {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn resolve_by_channel_id(&self, channel_id: &str) -> Result<ResolvedChannel, CoreError> {
        let data: ListResponse<Resource> = self
            .get_json("channels", &[("part", "snippet"), ("id", channel_id)])
            .await?;
        let label = data
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet)
            .and_then(|snippet| snippet.title);
        Ok(ResolvedChannel::new(channel_id, label))
    }

    async fn resolve_by_username(&self, username: &str) -> Result<ResolvedChannel, CoreError> {
        let data: ListResponse<Resource> = self
            .get_json("channels", &[("part", "snippet"), ("forUsername", username)])
            .await?;
        let item = data.items.into_iter().next();
        let label = item
            .as_ref()
            .and_then(|i| i.snippet.as_ref())
            .and_then(|s| s.title.clone());
        let channel_id = item
            .and_then(|i| i.id)
            .ok_or_else(|| CoreError::resolution("No channel found for that username."))?;
        Ok(ResolvedChannel::new(channel_id, label))
    }

    async fn resolve_by_search(&self, query: &str) -> Result<ResolvedChannel, CoreError> {
        let data: ListResponse<SearchResult> = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "channel"),
                    ("maxResults", "1"),
                    ("q", query),
                ],
            )
            .await?;
        let item = data.items.into_iter().next();
        let label = item
            .as_ref()
            .and_then(|i| i.snippet.as_ref())
            .and_then(|s| s.title.clone());
        let channel_id = item
            .and_then(|i| i.id)
            .and_then(|id| id.channel_id)
            .ok_or_else(|| CoreError::resolution("Channel not found."))?;
        Ok(ResolvedChannel::new(channel_id, label))
    }

    /// Most recent videos of one channel, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with an error status.
    pub async fn fetch_channel(&self, channel_id: &str) -> Result<Vec<ContentItem>, CoreError> {
        let max_results = self.max_results.to_string();
        let data: ListResponse<SearchResult> = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("order", "date"),
                    ("maxResults", &max_results),
                    ("channelId", channel_id),
                ],
            )
            .await?;

        Ok(data
            .items
            .into_iter()
            .filter_map(|item| item.into_video(channel_id))
            .collect())
    }
}

#[async_trait]
impl CatalogClient for YouTubeCatalog {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn resolve_channel(&self, raw: &str) -> Result<ResolvedChannel, CoreError> {
        let query = parse_channel_input(raw)
            .ok_or_else(|| CoreError::resolution("Enter a channel link, @handle or id."))?;
        info!(target: LOG_TARGET, "Resolving channel {:?}", query);

        match query {
            ChannelQuery::Id(id) => self.resolve_by_channel_id(&id).await,
            ChannelQuery::Username(username) => self.resolve_by_username(&username).await,
            ChannelQuery::Handle(handle) => self.resolve_by_search(&format!("@{handle}")).await,
            ChannelQuery::Search(text) => self.resolve_by_search(&text).await,
        }
    }

    async fn resolve_video(&self, raw: &str) -> Result<ContentItem, CoreError> {
        let video_id = extract_video_id(raw);
        if video_id.is_empty() {
            return Err(CoreError::resolution("Enter a video link or id."));
        }
        info!(target: LOG_TARGET, "Resolving video {}", video_id);

        let data: ListResponse<Resource> = self
            .get_json("videos", &[("part", "snippet"), ("id", &video_id)])
            .await?;
        let item = data
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::VideoNotFound {
                video_id: video_id.clone(),
            })?;

        Ok(item.snippet.unwrap_or_default().into_item(video_id, ""))
    }

    async fn fetch_recent_items(&self, channel_ids: &[String]) -> Result<RecentItems, CoreError> {
        info!(target: LOG_TARGET, "Fetching recent videos for {} channels", channel_ids.len());

        let results = join_all(
            channel_ids
                .iter()
                .map(|id| async move { (id, self.fetch_channel(id).await) }),
        )
        .await;

        let mut recent = RecentItems {
            items_by_channel: ItemsByChannel::with_capacity(results.len()),
            errors: Vec::new(),
        };
        for (channel_id, result) in results {
            let items = result.unwrap_or_else(|e| {
                warn!(target: LOG_TARGET, "Channel {} failed: {}", channel_id, e);
                recent
                    .errors
                    .push(format!("Failed to fetch videos for channel {channel_id}: {e}"));
                Vec::new()
            });
            recent.items_by_channel.insert(channel_id.clone(), items);
        }

        Ok(recent)
    }
}
