use crate::error::{JsonError, ProxyError, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rotator_core::{extract_video_id, CatalogClient, ContentItem, RecentItems, ResolvedChannel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "rotator::proxy";

pub const RESOLVE_CHANNEL_PATH: &str = "/api/resolve-channel";
pub const RESOLVE_VIDEO_PATH: &str = "/api/resolve-video";
pub const VIDEOS_PATH: &str = "/api/videos";
pub const HEALTH_PATH: &str = "/health";

pub const BLANK_CHANNEL_MESSAGE: &str = "Send a channel link, @handle or id.";
pub const BLANK_VIDEO_MESSAGE: &str = "Send a video link or id.";
pub const NO_CHANNELS_MESSAGE: &str = "Send at least one channel in the request.";

/// Body of both resolve endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub input: String,
}

/// Body of `/api/videos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsRequest {
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Shared router state. The catalog is absent when no API key is configured,
/// in which case every catalog endpoint answers 500.
#[derive(Clone, Default)]
pub struct AppState {
    catalog: Option<Arc<dyn CatalogClient>>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    #[must_use]
    pub fn without_catalog() -> Self {
        Self::default()
    }

    fn catalog(&self) -> Result<Arc<dyn CatalogClient>> {
        self.catalog.clone().ok_or(ProxyError::MissingApiKey)
    }
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(RESOLVE_CHANNEL_PATH, post(resolve_channel))
        .route(RESOLVE_VIDEO_PATH, post(resolve_video))
        .route(VIDEOS_PATH, post(videos))
        .route(HEALTH_PATH, get(|| async { "ok" }))
        .with_state(state)
}

/// Bind the listening socket.
///
/// # Errors
///
/// Returns [`ProxyError::Bind`] if the address is unavailable.
pub async fn bind(address: &str) -> Result<TcpListener> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ProxyError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Serve the router until `cancel_token` is cancelled, then drain in-flight
/// requests and return.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel_token: CancellationToken,
) -> Result<()> {
    let address = listener.local_addr()?;
    info!(target: LOG_TARGET, "Proxy listening on http://{}", address);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    info!(target: LOG_TARGET, "Proxy stopped");
    Ok(())
}

async fn resolve_channel(
    State(state): State<AppState>,
    Json(request): Json<InputRequest>,
) -> Result<Json<ResolvedChannel>> {
    let catalog = state.catalog()?;
    if request.input.trim().is_empty() {
        return Err(ProxyError::BadRequest(BLANK_CHANNEL_MESSAGE.into()));
    }

    debug!(target: LOG_TARGET, "resolve-channel {:?}", request.input);
    let resolved = catalog
        .resolve_channel(&request.input)
        .await
        .inspect_err(|e| warn!(target: LOG_TARGET, "Channel resolution failed: {}", e))?;
    Ok(Json(resolved))
}

async fn resolve_video(
    State(state): State<AppState>,
    Json(request): Json<InputRequest>,
) -> Result<Json<ContentItem>> {
    let catalog = state.catalog()?;
    if extract_video_id(&request.input).is_empty() {
        return Err(ProxyError::BadRequest(BLANK_VIDEO_MESSAGE.into()));
    }

    debug!(target: LOG_TARGET, "resolve-video {:?}", request.input);
    let item = catalog
        .resolve_video(&request.input)
        .await
        .inspect_err(|e| warn!(target: LOG_TARGET, "Video resolution failed: {}", e))?;
    Ok(Json(item))
}

async fn videos(
    State(state): State<AppState>,
    Json(request): Json<ChannelsRequest>,
) -> std::result::Result<Json<RecentItems>, JsonError> {
    let catalog = state.catalog()?;
    if request.channels.is_empty() {
        return Err(ProxyError::BadRequest(NO_CHANNELS_MESSAGE.into()).into());
    }

    debug!(target: LOG_TARGET, "videos for {} channels", request.channels.len());
    let recent = catalog.fetch_recent_items(&request.channels).await?;
    if let Some(summary) = recent.error_summary() {
        warn!(target: LOG_TARGET, "Partial catalog failure: {}", summary);
    }
    Ok(Json(recent))
}
