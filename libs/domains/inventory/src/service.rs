//! Inventory Service - Business logic layer

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::calculations::{
    abc_analysis, distribution, inventory_summary, project_stock, reorder_suggestions,
    value_distribution, AbcAnalysis, DistributionEntry, InventorySummary, ReorderSuggestion,
    StockProjection,
};
use crate::error::{InventoryError, InventoryResult};
use crate::export::{export_abc_report, export_products, ExportFormat};
use crate::filters::{
    evaluate_filters, get_low_stock_products, get_out_of_stock_products, group_by, paginate,
    sort_by, unique_values, FilterOutcome, ProductGroup,
};
use crate::format::{Formatter, Locale};
use crate::models::{
    FilterCriteria, GroupKey, ListRequest, NewSale, Page, Product, ProductDraft, ProductUpdate,
    StockAdjustment, LOW_STOCK_THRESHOLD,
};
use crate::notifications::NotificationCenter;
use crate::repository::ProductRepository;
use crate::validation::{validate_product, FormValidation};

/// Page size used when a list request does not name one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Tunables the service reads on every call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventorySettings {
    /// Cut-off for low-stock listings, summary counts and warnings.
    ///
    /// `Product::status` is derived with the fixed [`LOW_STOCK_THRESHOLD`]
    /// and does not follow this value.
    pub low_stock_threshold: i64,
    pub default_page_size: usize,
    pub locale: Locale,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            default_page_size: DEFAULT_PAGE_SIZE,
            locale: Locale::default(),
        }
    }
}

/// Inventory service providing business logic operations
///
/// The service validates input, enforces stock rules, runs the list pipeline
/// and analytics over the repository contents and publishes notifications for
/// every mutation.
pub struct InventoryService<R: ProductRepository> {
    repository: Arc<R>,
    notifications: NotificationCenter,
    settings: InventorySettings,
    formatter: Formatter,
}

impl<R: ProductRepository> InventoryService<R> {
    /// Create a new InventoryService with the given repository
    pub fn new(repository: R) -> Self {
        Self::with_settings(repository, NotificationCenter::default(), InventorySettings::default())
    }

    pub fn with_settings(
        repository: R,
        notifications: NotificationCenter,
        settings: InventorySettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            notifications,
            formatter: Formatter::new(settings.locale),
            settings,
        }
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Warn when a change moves a product into low stock or out of stock
    fn notify_stock_change(&self, before: Option<i64>, product: &Product) {
        let threshold = self.settings.low_stock_threshold;
        let was_low_or_out = before.is_some_and(|q| q <= threshold);
        let was_out = before.is_some_and(|q| q <= 0);

        if product.quantity <= 0 && !was_out {
            self.notifications.warning(
                "Producto agotado",
                format!("{} ({}) se quedó sin stock", product.name, product.sku),
            );
        } else if product.quantity > 0 && product.quantity <= threshold && !was_low_or_out {
            self.notifications.warning(
                "Stock bajo",
                format!(
                    "{} ({}) tiene solo {} unidades",
                    product.name, product.sku, product.quantity
                ),
            );
        }
    }

    async fn existing(&self, id: Uuid) -> InventoryResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(InventoryError::NotFound(id))
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: ProductDraft) -> InventoryResult<Product> {
        input.validate()?;

        if self.repository.exists_by_sku(&input.sku).await? {
            return Err(InventoryError::DuplicateSku(input.sku.trim().to_string()));
        }

        let product = self.repository.create(input).await?;
        self.notifications.success(
            "Producto creado",
            format!("{} agregado al inventario", product.name),
        );
        self.notify_stock_change(None, &product);
        Ok(product)
    }

    /// Per-field messages for a product form, including a taken SKU.
    ///
    /// Never fails on bad input; only repository errors are returned.
    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    pub async fn check_draft(&self, draft: &ProductDraft) -> InventoryResult<FormValidation> {
        let mut form = validate_product(draft);
        if !form.errors.contains_key("sku") && self.repository.exists_by_sku(&draft.sku).await? {
            form.errors.insert(
                "sku".to_string(),
                "Ya existe un producto con este SKU".to_string(),
            );
            form.is_valid = false;
        }
        Ok(form)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> InventoryResult<Product> {
        self.existing(id).await
    }

    /// Get a product by SKU
    #[instrument(skip(self))]
    pub async fn get_by_sku(&self, sku: &str) -> InventoryResult<Product> {
        self.repository
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| InventoryError::SkuNotFound(sku.to_string()))
    }

    /// Get a product by barcode
    #[instrument(skip(self))]
    pub async fn get_by_barcode(&self, barcode: &str) -> InventoryResult<Product> {
        self.repository
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| InventoryError::BarcodeNotFound(barcode.to_string()))
    }

    /// Update an existing product
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: ProductUpdate) -> InventoryResult<Product> {
        input.validate()?;

        let existing = self.existing(id).await?;

        if let Some(ref new_sku) = input.sku {
            if !existing.sku.eq_ignore_ascii_case(new_sku.trim())
                && self.repository.exists_by_sku(new_sku).await?
            {
                return Err(InventoryError::DuplicateSku(new_sku.trim().to_string()));
            }
        }

        // Bounds may be split across the stored product and the update
        let min_stock = input.min_stock.unwrap_or(existing.min_stock);
        let max_stock = input.max_stock.unwrap_or(existing.max_stock);
        if max_stock > 0 && min_stock > max_stock {
            return Err(InventoryError::Validation(
                "El stock mínimo no puede superar al máximo".to_string(),
            ));
        }

        let product = self.repository.update(id, input).await?;
        self.notifications.success(
            "Producto actualizado",
            format!("{} se guardó correctamente", product.name),
        );
        self.notify_stock_change(Some(existing.quantity), &product);
        Ok(product)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> InventoryResult<()> {
        let existing = self.existing(id).await?;

        if !self.repository.delete(id).await? {
            return Err(InventoryError::NotFound(id));
        }

        self.notifications.success(
            "Producto eliminado",
            format!("{} fue eliminado del inventario", existing.name),
        );
        Ok(())
    }

    /// Add or remove units; the result may not go negative
    #[instrument(skip(self, adjustment), fields(delta = adjustment.quantity))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        adjustment: StockAdjustment,
    ) -> InventoryResult<Product> {
        adjustment.validate()?;

        let (before, updated) = self
            .repository
            .adjust_quantity(id, adjustment.quantity)
            .await?;

        tracing::info!(product_id = %id, reason = %adjustment.reason, stock = updated.quantity, "Stock adjusted");
        self.notifications.success(
            "Stock actualizado",
            format!("{}: {} → {} unidades", updated.name, before, updated.quantity),
        );
        self.notify_stock_change(Some(before), &updated);
        Ok(updated)
    }

    /// Sell units: decrement stock and append to the sales history
    #[instrument(skip(self, sale), fields(quantity = sale.quantity))]
    pub async fn record_sale(&self, id: Uuid, sale: NewSale) -> InventoryResult<Product> {
        sale.validate()?;

        let (before, updated) = self
            .repository
            .sell(id, sale.quantity, sale.sold_at.unwrap_or_else(Utc::now))
            .await?;

        self.notifications.success(
            "Venta registrada",
            format!("{} unidades de {}", sale.quantity, updated.name),
        );
        self.notify_stock_change(Some(before), &updated);
        Ok(updated)
    }

    /// Filter, sort and paginate the product list
    #[instrument(skip(self, request))]
    pub async fn list_products(&self, request: ListRequest) -> InventoryResult<Page<Product>> {
        let products = self.repository.list_all().await?;

        let filtered = match evaluate_filters(&products, &request.criteria) {
            FilterOutcome::Matched(products) => products,
            FilterOutcome::NoMatches => Vec::new(),
            FilterOutcome::InvalidCriteria(reason) => {
                return Err(InventoryError::Validation(reason));
            }
        };

        let sorted = match request.sort {
            Some(sort) => sort_by(&filtered, sort.field, sort.direction),
            None => filtered,
        };

        let page = paginate(
            &sorted,
            request.page.unwrap_or(1),
            request.page_size.unwrap_or(self.settings.default_page_size),
        );
        tracing::debug!(total = page.total, page = page.page, "Listed products");
        Ok(page)
    }

    /// Group every product by `key`
    #[instrument(skip(self))]
    pub async fn group_products(&self, key: GroupKey) -> InventoryResult<Vec<ProductGroup>> {
        let products = self.repository.list_all().await?;
        Ok(group_by(&products, key))
    }

    /// Distinct values of `key`, for filter dropdowns
    #[instrument(skip(self))]
    pub async fn filter_options(&self, key: GroupKey) -> InventoryResult<Vec<String>> {
        let products = self.repository.list_all().await?;
        Ok(unique_values(&products, key))
    }

    /// In-stock products at or under `threshold` (the configured one by default)
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: Option<i64>) -> InventoryResult<Vec<Product>> {
        let products = self.repository.list_all().await?;
        Ok(get_low_stock_products(
            &products,
            threshold.unwrap_or(self.settings.low_stock_threshold),
        ))
    }

    #[instrument(skip(self))]
    pub async fn out_of_stock(&self) -> InventoryResult<Vec<Product>> {
        let products = self.repository.list_all().await?;
        Ok(get_out_of_stock_products(&products))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> InventoryResult<InventorySummary> {
        let products = self.repository.list_all().await?;
        Ok(inventory_summary(&products, self.settings.low_stock_threshold))
    }

    /// Count shares per bucket, or value shares when `by_value` is set
    #[instrument(skip(self))]
    pub async fn distribution(
        &self,
        key: GroupKey,
        by_value: bool,
    ) -> InventoryResult<Vec<DistributionEntry>> {
        let products = self.repository.list_all().await?;
        Ok(if by_value {
            value_distribution(&products, key)
        } else {
            distribution(&products, key)
        })
    }

    #[instrument(skip(self))]
    pub async fn abc_analysis(&self) -> InventoryResult<AbcAnalysis> {
        let products = self.repository.list_all().await?;
        Ok(abc_analysis(&products))
    }

    /// Days of cover for one product from its sales history
    #[instrument(skip(self))]
    pub async fn stock_projection(&self, id: Uuid) -> InventoryResult<StockProjection> {
        let product = self.existing(id).await?;
        let sales = self.repository.sales_for(id).await?;
        Ok(project_stock(&product, &sales))
    }

    #[instrument(skip(self))]
    pub async fn reorder_suggestions(&self) -> InventoryResult<Vec<ReorderSuggestion>> {
        let products = self.repository.list_all().await?;
        Ok(reorder_suggestions(&products))
    }

    /// Render the products matching `criteria` in `format`
    #[instrument(skip(self, criteria))]
    pub async fn export(
        &self,
        format: ExportFormat,
        criteria: FilterCriteria,
    ) -> InventoryResult<String> {
        let products = self.repository.list_all().await?;
        let selected = match evaluate_filters(&products, &criteria) {
            FilterOutcome::InvalidCriteria(reason) => {
                return Err(InventoryError::Validation(reason));
            }
            outcome => outcome.into_products(),
        };
        export_products(&selected, format, &self.formatter)
    }

    /// ABC table as CSV
    #[instrument(skip(self))]
    pub async fn export_abc(&self) -> InventoryResult<String> {
        let analysis = self.abc_analysis().await?;
        export_abc_report(&analysis)
    }
}
