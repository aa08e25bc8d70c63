use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::InventoryResult;
use crate::models::{Product, ProductDraft, ProductUpdate, SaleRecord};

/// Quantity on hand before a stock write, and the product after it
pub type StockChange = (i64, Product);

/// Repository trait for product persistence
///
/// Filtering, sorting and analytics run over `list_all` in the service, so
/// implementations only need lookups and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, in insertion order
    async fn list_all(&self) -> InventoryResult<Vec<Product>>;

    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>>;

    /// Get a product by SKU (case-insensitive)
    async fn get_by_sku(&self, sku: &str) -> InventoryResult<Option<Product>>;

    /// Get a product by barcode
    async fn get_by_barcode(&self, barcode: &str) -> InventoryResult<Option<Product>>;

    /// Create a new product
    async fn create(&self, input: ProductDraft) -> InventoryResult<Product>;

    /// Apply a partial update
    async fn update(&self, id: Uuid, input: ProductUpdate) -> InventoryResult<Product>;

    /// Delete a product by ID, returning whether it existed
    async fn delete(&self, id: Uuid) -> InventoryResult<bool>;

    /// Add `delta` units in one step with the stock check.
    ///
    /// Fails with `InsufficientStock` when the result would go negative.
    async fn adjust_quantity(&self, id: Uuid, delta: i64) -> InventoryResult<StockChange>;

    /// Check if a SKU is taken
    async fn exists_by_sku(&self, sku: &str) -> InventoryResult<bool>;

    /// Decrement stock and append the sale as one write.
    ///
    /// Fails with `InsufficientStock` when `quantity` exceeds the stock on
    /// hand; nothing is written in that case.
    async fn sell(
        &self,
        id: Uuid,
        quantity: i64,
        sold_at: DateTime<Utc>,
    ) -> InventoryResult<StockChange>;

    /// Sales history of one product, oldest first
    async fn sales_for(&self, product_id: Uuid) -> InventoryResult<Vec<SaleRecord>>;
}
