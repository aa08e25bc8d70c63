//! Configuration for Inventory API

use core_config::{
    app_info, env_flag, env_or_default, env_parse, server::ServerConfig, storage::StorageConfig,
    AppInfo, ConfigError, FromEnv,
};
use domain_inventory::{InventorySettings, Locale};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub environment: Environment,
    pub inventory: InventorySettings,
    /// Load the demo catalogue when the store starts empty
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage = StorageConfig::from_env()?;
        let inventory = inventory_settings_from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            storage,
            environment,
            inventory,
            seed_demo_data: env_flag("SEED_DEMO_DATA"),
        })
    }
}

/// - LOW_STOCK_THRESHOLD: defaults to 10. Drives `/low-stock`, the summary's
///   `lowStockCount` and low-stock warnings. A product's `status` field keeps
///   the fixed cut-off of 10 (`domain_inventory::models::LOW_STOCK_THRESHOLD`).
/// - DEFAULT_PAGE_SIZE: defaults to 20
/// - INVENTORY_LOCALE: es-CL (default) or en-US
fn inventory_settings_from_env() -> Result<InventorySettings, ConfigError> {
    let defaults = InventorySettings::default();
    let locale_raw = env_or_default("INVENTORY_LOCALE", &defaults.locale.to_string());
    let locale = locale_raw
        .trim()
        .parse::<Locale>()
        .map_err(|e| ConfigError::ParseError {
            key: "INVENTORY_LOCALE".to_string(),
            details: e.to_string(),
        })?;

    Ok(InventorySettings {
        low_stock_threshold: env_parse("LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,
        default_page_size: env_parse("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
        locale,
    })
}
