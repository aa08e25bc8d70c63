//! Application state management

use domain_inventory::{JsonStore, NotificationCenter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub store: JsonStore,
    pub notifications: NotificationCenter,
}
