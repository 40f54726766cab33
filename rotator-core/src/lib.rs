pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod library;
pub mod model;
pub mod paths;
pub mod playback;
pub mod preferences;
pub mod queue;
pub mod session;
pub mod store;
pub mod timer;

pub use catalog::{CatalogClient, RecentItems, ResolvedChannel};
pub use clock::PlayerClock;
pub use config::{
    CatalogConfig, LoggingConfig, ProxyConfig, RotatorConfig, API_KEY_ENV_VAR, CONFIG_TEMPLATE,
};

/// Re-export toml error type for config parsing error handling
pub use toml::de::Error as TomlParseError;
pub use error::{CoreError, Result};
pub use input::{extract_video_id, is_likely_video_input, parse_channel_input, ChannelQuery};
pub use library::Library;
pub use model::{Channel, ContentItem};
pub use paths::{
    config_dir, config_path, log_file_path, state_dir, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    LOG_FILE_NAME, STATE_DIR_NAME,
};
pub use playback::{
    transition, Effect, PlaybackEvent, PlaybackInputs, PlaybackMode, PlaybackState,
    RebuildOrigin, ResumePoint, Transition,
};
pub use preferences::{LayoutMode, Preferences, PreferencesRecord, TickerPosition, TickerStyle};
pub use queue::{build_queue, build_queue_with_rng, ItemsByChannel};
pub use session::{AddedSource, Session, SessionEvent, SessionHandle, SessionSnapshot};
pub use store::{PersistedState, StateStore};
pub use timer::BreakTimer;
