//! Inventory API routes

use axum::Router;
use domain_inventory::{handlers, InventoryService, LocalProductRepository, ProductRepository};
use tracing::info;

use crate::seed::demo_catalogue;
use crate::state::AppState;

/// Build the repository and service, seed demo data if asked, return the router
pub async fn router(state: &AppState) -> eyre::Result<Router> {
    let repository = LocalProductRepository::load(state.store.clone())
        .await?
        .with_latency(state.config.storage.simulated_latency);

    let needs_seed = state.config.seed_demo_data && repository.list_all().await?.is_empty();

    let service = InventoryService::with_settings(
        repository,
        state.notifications.clone(),
        state.config.inventory,
    );

    if needs_seed {
        let drafts = demo_catalogue();
        let count = drafts.len();
        for draft in drafts {
            service.create_product(draft).await?;
        }
        // Seeding should not fill the toast history
        state.notifications.clear();
        info!(count, "Seeded demo catalogue");
    }

    Ok(handlers::router(service))
}
