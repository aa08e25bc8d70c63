//! API routes module

pub mod health;
pub mod inventory;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub async fn routes(state: &AppState) -> eyre::Result<Router> {
    Ok(Router::new()
        .nest("/products", inventory::router(state).await?)
        .merge(health::router(state.clone())))
}
