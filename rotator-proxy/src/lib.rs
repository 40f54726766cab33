pub mod client;
pub mod error;
pub mod server;

pub use client::{
    ProxyCatalog, CHANNEL_FALLBACK_MESSAGE, VIDEOS_FAILED_MESSAGE, VIDEO_FALLBACK_MESSAGE,
};
pub use error::{JsonError, ProxyError, Result};
pub use server::{
    bind, build_router, serve, AppState, ChannelsRequest, InputRequest, BLANK_CHANNEL_MESSAGE,
    BLANK_VIDEO_MESSAGE, HEALTH_PATH, NO_CHANNELS_MESSAGE, RESOLVE_CHANNEL_PATH,
    RESOLVE_VIDEO_PATH, VIDEOS_PATH,
};
