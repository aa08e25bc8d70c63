//! Inventory API - REST server

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_inventory::{JsonStore, NotificationCenter};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

mod api;
mod config;
mod openapi;
mod seed;
mod server;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let store = match &config.storage.directory {
        Some(dir) => JsonStore::open(dir).await?,
        None => {
            info!("INVENTORY_STORAGE_DIR not set, keeping inventory in memory");
            JsonStore::in_memory()
        }
    };

    let state = AppState {
        config: config.clone(),
        store,
        notifications: NotificationCenter::default(),
    };

    // Mirror notifications into the log
    let mut notifications = state.notifications.subscribe();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => info!(
                    level = %notification.level,
                    title = %notification.title,
                    message = %notification.message,
                    "Notification"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let api_routes = api::routes(&state).await?;
    let app = server::create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    info!(
        name = state.config.app.name,
        version = state.config.app.version,
        port = state.config.server.port,
        persistent = state.store.is_persistent(),
        "Starting Inventory API"
    );

    server::serve(app, &state.config.server).await?;

    info!("Inventory API shutdown complete");
    Ok(())
}
