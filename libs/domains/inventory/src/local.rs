//! Local implementation of ProductRepository backed by the JSON store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Product, ProductDraft, ProductUpdate, SaleRecord};
use crate::repository::{ProductRepository, StockChange};
use crate::storage::{JsonStore, StorageKey};

/// Products and sales held in memory, written through to a [`JsonStore`]
pub struct LocalProductRepository {
    store: JsonStore,
    products: RwLock<Vec<Product>>,
    sales: RwLock<Vec<SaleRecord>>,
    latency: Duration,
}

impl LocalProductRepository {
    /// Empty repository over a volatile store
    pub fn in_memory() -> Self {
        Self {
            store: JsonStore::in_memory(),
            products: RwLock::new(Vec::new()),
            sales: RwLock::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Load whatever the store already holds
    pub async fn load(store: JsonStore) -> InventoryResult<Self> {
        let mut products: Vec<Product> = store.get(StorageKey::Products).await?.unwrap_or_default();
        // Stored statuses may be stale or hand-edited
        for product in &mut products {
            product.refresh_status();
        }
        let sales: Vec<SaleRecord> = store.get(StorageKey::Sales).await?.unwrap_or_default();

        tracing::info!(
            products = products.len(),
            sales = sales.len(),
            persistent = store.is_persistent(),
            "Loaded inventory"
        );

        Ok(Self {
            store,
            products: RwLock::new(products),
            sales: RwLock::new(sales),
            latency: Duration::ZERO,
        })
    }

    /// Sleep this long before every call, to mimic a remote backend
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Write `next` to the store, then swap it in; memory is untouched on error
    async fn commit_products(&self, current: &mut Vec<Product>, next: Vec<Product>) -> InventoryResult<()> {
        self.store.set(StorageKey::Products, &next).await?;
        *current = next;
        Ok(())
    }

    async fn commit_sales(&self, current: &mut Vec<SaleRecord>, next: Vec<SaleRecord>) -> InventoryResult<()> {
        self.store.set(StorageKey::Sales, &next).await?;
        *current = next;
        Ok(())
    }
}

fn same_sku(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn position(products: &[Product], id: Uuid) -> InventoryResult<usize> {
    products
        .iter()
        .position(|p| p.id == id)
        .ok_or(InventoryError::NotFound(id))
}

#[async_trait]
impl ProductRepository for LocalProductRepository {
    #[instrument(skip(self))]
    async fn list_all(&self) -> InventoryResult<Vec<Product>> {
        self.simulate_latency().await;
        Ok(self.products.read().await.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        self.simulate_latency().await;
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_by_sku(&self, sku: &str) -> InventoryResult<Option<Product>> {
        self.simulate_latency().await;
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| same_sku(&p.sku, sku))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn get_by_barcode(&self, barcode: &str) -> InventoryResult<Option<Product>> {
        self.simulate_latency().await;
        let barcode = barcode.trim();
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.barcode.as_deref().map(str::trim) == Some(barcode))
            .cloned())
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    async fn create(&self, input: ProductDraft) -> InventoryResult<Product> {
        self.simulate_latency().await;
        let mut products = self.products.write().await;

        if products.iter().any(|p| same_sku(&p.sku, &input.sku)) {
            return Err(InventoryError::DuplicateSku(input.sku.trim().to_string()));
        }

        let product = Product::new(input);
        let mut next = products.clone();
        next.push(product.clone());
        self.commit_products(&mut products, next).await?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: ProductUpdate) -> InventoryResult<Product> {
        self.simulate_latency().await;
        let mut products = self.products.write().await;

        if let Some(sku) = &input.sku {
            if products.iter().any(|p| p.id != id && same_sku(&p.sku, sku)) {
                return Err(InventoryError::DuplicateSku(sku.trim().to_string()));
            }
        }

        let index = position(&products, id)?;
        let mut next = products.clone();
        next[index].apply_update(input);
        let updated = next[index].clone();
        self.commit_products(&mut products, next).await?;

        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> InventoryResult<bool> {
        self.simulate_latency().await;
        let mut products = self.products.write().await;
        if !products.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        let next: Vec<Product> = products.iter().filter(|p| p.id != id).cloned().collect();
        self.commit_products(&mut products, next).await?;
        drop(products);

        // Orphaned sales are unreachable once the product is gone
        let mut sales = self.sales.write().await;
        if sales.iter().any(|s| s.product_id == id) {
            let next: Vec<SaleRecord> = sales.iter().filter(|s| s.product_id != id).cloned().collect();
            if let Err(e) = self.commit_sales(&mut sales, next).await {
                tracing::warn!(product_id = %id, error = %e, "Could not drop sales of deleted product");
            }
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn adjust_quantity(&self, id: Uuid, delta: i64) -> InventoryResult<StockChange> {
        self.simulate_latency().await;
        let mut products = self.products.write().await;
        let index = position(&products, id)?;

        let before = products[index].quantity;
        let quantity = before + delta;
        if quantity < 0 {
            return Err(InventoryError::InsufficientStock {
                available: before,
                requested: -delta,
            });
        }

        let mut next = products.clone();
        next[index].set_quantity(quantity);
        let updated = next[index].clone();
        self.commit_products(&mut products, next).await?;

        tracing::info!(product_id = %id, before, quantity, status = %updated.status, "Stock updated");
        Ok((before, updated))
    }

    #[instrument(skip(self))]
    async fn exists_by_sku(&self, sku: &str) -> InventoryResult<bool> {
        self.simulate_latency().await;
        Ok(self.products.read().await.iter().any(|p| same_sku(&p.sku, sku)))
    }

    #[instrument(skip(self))]
    async fn sell(
        &self,
        id: Uuid,
        quantity: i64,
        sold_at: DateTime<Utc>,
    ) -> InventoryResult<StockChange> {
        self.simulate_latency().await;
        // Products before sales, same order as delete
        let mut products = self.products.write().await;
        let mut sales = self.sales.write().await;
        let index = position(&products, id)?;

        let before = products[index].quantity;
        if quantity > before {
            return Err(InventoryError::InsufficientStock {
                available: before,
                requested: quantity,
            });
        }

        let mut next_products = products.clone();
        next_products[index].set_quantity(before - quantity);
        let updated = next_products[index].clone();
        let mut next_sales = sales.clone();
        next_sales.push(SaleRecord {
            product_id: id,
            quantity,
            sold_at,
        });

        self.store.set(StorageKey::Products, &next_products).await?;
        if let Err(e) = self.store.set(StorageKey::Sales, &next_sales).await {
            // Restore the stored products; the sale did not happen
            if let Err(rollback) = self.store.set(StorageKey::Products, &*products).await {
                tracing::error!(product_id = %id, error = %rollback, "Could not roll back stock after failed sale");
            }
            return Err(e);
        }
        *products = next_products;
        *sales = next_sales;

        tracing::info!(product_id = %id, quantity, remaining = updated.quantity, "Sale recorded");
        Ok((before, updated))
    }

    #[instrument(skip(self))]
    async fn sales_for(&self, product_id: Uuid) -> InventoryResult<Vec<SaleRecord>> {
        self.simulate_latency().await;
        let mut sales: Vec<SaleRecord> = self
            .sales
            .read()
            .await
            .iter()
            .filter(|s| s.product_id == product_id)
            .cloned()
            .collect();
        sales.sort_by_key(|s| s.sold_at);
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockStatus;
    use std::sync::Arc;

    fn draft(sku: &str, quantity: i64) -> ProductDraft {
        ProductDraft {
            sku: sku.into(),
            name: format!("Producto {sku}"),
            price: 1000.0,
            quantity,
            barcode: Some("7801234567890".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 40)).await.unwrap();

        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.get_by_sku("tor-001").await.unwrap(), Some(created.clone()));
        assert_eq!(
            repo.get_by_barcode(" 7801234567890 ").await.unwrap(),
            Some(created)
        );
        assert!(repo.exists_by_sku("TOR-001").await.unwrap());
        assert!(!repo.exists_by_sku("TOR-002").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_sku() {
        let repo = LocalProductRepository::in_memory();
        repo.create(draft("TOR-001", 1)).await.unwrap();
        let err = repo.create(draft("tor-001", 1)).await.unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateSku(_)));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = LocalProductRepository::in_memory();
        let err = repo
            .update(Uuid::now_v7(), ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_adjust_quantity_recomputes_status() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 40)).await.unwrap();
        let (before, updated) = repo.adjust_quantity(created.id, -40).await.unwrap();
        assert_eq!(before, 40);
        assert_eq!(updated.status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_adjust_quantity_rejects_negative_result() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 4)).await.unwrap();
        let err = repo.adjust_quantity(created.id, -5).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                available: 4,
                requested: 5
            }
        ));
        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_sell_decrements_and_records() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 10)).await.unwrap();
        let (before, updated) = repo.sell(created.id, 3, Utc::now()).await.unwrap();

        assert_eq!(before, 10);
        assert_eq!(updated.quantity, 7);
        let sales = repo.sales_for(created.id).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_sell_rejects_overselling_without_writing() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 2)).await.unwrap();
        let err = repo.sell(created.id, 3, Utc::now()).await.unwrap_err();

        assert!(matches!(err, InventoryError::InsufficientStock { .. }));
        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().quantity, 2);
        assert!(repo.sales_for(created.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_never_oversell() {
        let repo = Arc::new(
            LocalProductRepository::in_memory().with_latency(Duration::from_millis(20)),
        );
        let id = repo.create(draft("TOR-001", 5)).await.unwrap().id;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.sell(id, 5, Utc::now()).await })
            })
            .collect();
        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().quantity, 0);
        let sold: i64 = repo.sales_for(id).await.unwrap().iter().map(|s| s.quantity).sum();
        assert_eq!(sold, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_adjustments_all_apply() {
        let repo = Arc::new(
            LocalProductRepository::in_memory().with_latency(Duration::from_millis(20)),
        );
        let id = repo.create(draft("TOR-001", 10)).await.unwrap().id;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.adjust_quantity(id, 5).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().quantity, 20);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = std::env::temp_dir().join(format!("inventory-local-{}", Uuid::now_v7()));
        let store = JsonStore::open(&dir).await.unwrap();
        let repo = LocalProductRepository::load(store).await.unwrap();
        let created = repo.create(draft("TOR-001", 8)).await.unwrap();

        std::fs::remove_dir_all(&dir).unwrap();

        let err = repo.create(draft("TOR-002", 1)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Storage(_)));
        assert!(repo.adjust_quantity(created.id, 5).await.is_err());
        assert!(repo.sell(created.id, 2, Utc::now()).await.is_err());

        let products = repo.list_all().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 8);
        assert!(repo.sales_for(created.id).await.unwrap().is_empty());
        assert!(!repo.exists_by_sku("TOR-002").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_drops_sales() {
        let repo = LocalProductRepository::in_memory();
        let created = repo.create(draft("TOR-001", 40)).await.unwrap();
        repo.sell(created.id, 3, Utc::now()).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.sales_for(created.id).await.unwrap().is_empty());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_recomputes_stale_status() {
        let store = JsonStore::in_memory();
        let mut stale = Product::new(draft("TOR-001", 3));
        stale.status = StockStatus::Available;
        store.set(StorageKey::Products, &vec![stale]).await.unwrap();

        let repo = LocalProductRepository::load(store).await.unwrap();
        let products = repo.list_all().await.unwrap();
        assert_eq!(products[0].status, StockStatus::LowStock);
    }

    #[tokio::test]
    async fn test_writes_reach_the_store() {
        let store = JsonStore::in_memory();
        let repo = LocalProductRepository::load(store.clone()).await.unwrap();
        repo.create(draft("TOR-001", 5)).await.unwrap();

        let reloaded = LocalProductRepository::load(store).await.unwrap();
        assert_eq!(reloaded.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_reports_corrupt_products_as_serialization() {
        let dir = std::env::temp_dir().join(format!("inventory-corrupt-{}", Uuid::now_v7()));
        let store = JsonStore::open(&dir).await.unwrap();
        std::fs::write(dir.join("inventory_products.json"), "[{\"sku\":").unwrap();

        let err = LocalProductRepository::load(store).await.err().unwrap();
        assert!(matches!(err, InventoryError::Serialization(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency() {
        let repo = LocalProductRepository::in_memory().with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();
        repo.list_all().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
