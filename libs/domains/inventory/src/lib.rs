//! Inventory Domain
//!
//! Product catalogue with stock tracking, list filtering and inventory
//! analytics, persisted to a local JSON store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────────────────────────┐
//! │   Service   │  ──► │ filters · calculations ·     │
//! └──────┬──────┘      │ export · notifications       │
//!        │             └──────────────────────────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + local JSON store implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, filter criteria
//! └─────────────┘
//! ```
//!
//! The `filters` and `calculations` modules are plain functions over product
//! slices and can be used without the service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_inventory::{handlers, InventoryService, JsonStore, LocalProductRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonStore::open("./data").await?;
//! let repository = LocalProductRepository::load(store).await?;
//! let service = InventoryService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod calculations;
pub mod error;
pub mod export;
pub mod extract;
pub mod filters;
pub mod format;
pub mod handlers;
pub mod local;
pub mod models;
pub mod notifications;
pub mod repository;
pub mod service;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use calculations::{
    AbcAnalysis, AbcClass, DistributionEntry, InventorySummary, ReorderSuggestion,
    StockProjection,
};
pub use error::{ErrorResponse, InventoryError, InventoryResult};
pub use export::ExportFormat;
pub use filters::{FilterOutcome, ProductGroup};
pub use format::{Formatter, Locale};
pub use handlers::ApiDoc;
pub use local::LocalProductRepository;
pub use models::{
    FilterCriteria, GroupKey, ListQuery, ListRequest, NewSale, Page, Product, ProductDraft,
    ProductUpdate, SaleRecord, SortConfig, SortDirection, SortField, StockAdjustment,
    StockStatus,
};
pub use notifications::{Notification, NotificationCenter, NotificationLevel};
pub use repository::ProductRepository;
pub use service::{InventoryService, InventorySettings};
pub use storage::{JsonStore, StorageKey};
pub use validation::{FormValidation, ValidationResult};
