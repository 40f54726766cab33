use rotator_core::{CoreError, RotatorConfig};
use rotator_proxy::AppState;
use rotator_youtube::YouTubeCatalog;
use std::fs::File;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // Check config for logging.enabled before full config load
    init_tracing(check_file_logging_enabled());

    let config = match RotatorConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!(
                "Created config template at {}. Add your catalog API key and restart.",
                path.display()
            );
            std::process::exit(0);
        }
        Err(CoreError::ConfigParseError(parse_error)) => {
            error!(
                "Config file {} has syntax errors: {parse_error}",
                RotatorConfig::config_path().display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let state = create_app_state(&config);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let result = runtime.block_on(async {
        let listener = rotator_proxy::bind(&config.proxy.bind_address).await?;
        rotator_proxy::serve(listener, state, cancel_token).await
    });

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Build router state; without an API key the server still starts and the
/// catalog endpoints answer 500.
fn create_app_state(config: &RotatorConfig) -> AppState {
    match YouTubeCatalog::from_config(&config.catalog) {
        Ok(catalog) => {
            info!(
                "Using YouTube catalog at {} ({} videos per channel)",
                config.catalog.base_url, config.catalog.max_results
            );
            AppState::new(Arc::new(catalog))
        }
        Err(CoreError::ConfigMissingField { field }) => {
            warn!("No catalog API key configured ({field}); catalog endpoints will fail");
            AppState::without_catalog()
        }
        Err(e) => {
            error!("Failed to create catalog client: {e}");
            std::process::exit(1);
        }
    }
}

fn check_file_logging_enabled() -> bool {
    let Ok(content) = std::fs::read_to_string(RotatorConfig::config_path()) else {
        return false;
    };

    RotatorConfig::parse(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer();

    if file_logging_enabled {
        let log_path = rotator_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
