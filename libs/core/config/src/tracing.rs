use crate::Environment;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with the project defaults.
///
/// Safe to call more than once; later calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Resolve the log filter directive.
///
/// Precedence: `RUST_LOG`, then `LOG_LEVEL`, then the environment default.
pub fn filter_directive(environment: &Environment) -> String {
    env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env::var("LOG_LEVEL").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| environment.default_log_level().to_string())
}

/// Initialize the global tracing subscriber.
///
/// - Production: JSON lines without module targets
/// - Development: pretty, human readable output
///
/// Both include the `tracing-error` layer so eyre reports carry span traces.
/// Calling this twice is harmless (the second call is logged and skipped).
pub fn init_tracing(environment: &Environment) {
    let directive = filter_directive(environment);
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_level()));

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(filter = %directive, "Tracing initialized. Environment: {:?}", environment),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
