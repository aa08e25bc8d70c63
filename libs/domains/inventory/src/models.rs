use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::SKU_PATTERN;

/// Quantity at or below which an in-stock product counts as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Sentinel used by list screens for "no constraint"
pub const ALL_SENTINEL: &str = "all";

/// Stock status, always derived from the quantity on hand
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StockStatus {
    /// Nothing left on hand
    OutOfStock,
    /// Above zero but at or under the low-stock threshold
    LowStock,
    /// Comfortably stocked
    #[default]
    Available,
}

impl StockStatus {
    /// Derive the status for a quantity
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity <= LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::Available
        }
    }

    /// Spanish label shown in reports
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Agotado",
            StockStatus::LowStock => "Stock bajo",
            StockStatus::Available => "Disponible",
        }
    }
}

/// Product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    /// Stock keeping unit
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    /// Warehouse location / shelf
    #[serde(default)]
    pub location: Option<String>,
    /// Sale price
    pub price: f64,
    /// Unit cost
    #[serde(default)]
    pub cost: f64,
    pub quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub max_stock: i64,
    /// Derived from `quantity`; recomputed on every mutation and load
    #[serde(default)]
    pub status: StockStatus,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    /// Free-form dimensions, e.g. "20x10x5 cm"
    #[serde(default)]
    pub dimensions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    /// Create a new product from a draft
    pub fn new(input: ProductDraft) -> Self {
        let now = Utc::now();
        let mut product = Self {
            id: Uuid::now_v7(),
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            category: input.category,
            supplier: input.supplier,
            location: input.location,
            price: input.price,
            cost: input.cost,
            quantity: input.quantity,
            min_stock: input.min_stock,
            max_stock: input.max_stock,
            status: StockStatus::default(),
            barcode: input.barcode,
            weight: input.weight,
            dimensions: input.dimensions,
            created_at: now,
            last_updated: now,
        };
        product.refresh_status();
        product
    }

    /// Status computed from the current quantity
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// Overwrite the stored status with the derived one
    pub fn refresh_status(&mut self) {
        self.status = self.stock_status();
    }

    /// Inventory value of the product (price × quantity)
    pub fn value(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Capital tied up in the product (cost × quantity)
    pub fn cost_value(&self) -> f64 {
        self.cost * self.quantity as f64
    }

    /// Set the quantity and recompute the status
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.refresh_status();
        self.last_updated = Utc::now();
    }

    /// Apply a partial update
    pub fn apply_update(&mut self, update: ProductUpdate) {
        if let Some(sku) = update.sku {
            self.sku = sku.trim().to_string();
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(supplier) = update.supplier {
            self.supplier = Some(supplier);
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(cost) = update.cost {
            self.cost = cost;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(min_stock) = update.min_stock {
            self.min_stock = min_stock;
        }
        if let Some(max_stock) = update.max_stock {
            self.max_stock = max_stock;
        }
        if let Some(barcode) = update.barcode {
            self.barcode = Some(barcode);
        }
        if let Some(weight) = update.weight {
            self.weight = Some(weight);
        }
        if let Some(dimensions) = update.dimensions {
            self.dimensions = Some(dimensions);
        }
        self.refresh_status();
        self.last_updated = Utc::now();
    }
}

fn validate_stock_bounds(draft: &ProductDraft) -> Result<(), ValidationError> {
    if draft.max_stock > 0 && draft.min_stock > draft.max_stock {
        let mut err = ValidationError::new("stock_range");
        err.message = Some("El stock mínimo no puede superar al máximo".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for creating a product
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_stock_bounds", skip_on_field_errors = false))]
pub struct ProductDraft {
    #[validate(length(min = 3, max = 50), regex(path = *SKU_PATTERN))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub cost: f64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub quantity: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub min_stock: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub max_stock: i64,
    #[validate(length(min = 8, max = 14))]
    #[serde(default)]
    pub barcode: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<String>,
}

/// DTO for a partial product update
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 3, max = 50), regex(path = *SKU_PATTERN))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub max_stock: Option<i64>,
    #[validate(length(min = 8, max = 14))]
    pub barcode: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
}

/// Stock adjustment request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct StockAdjustment {
    /// Units to add (positive) or remove (negative)
    pub quantity: i64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// A single sale, the input to stock projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub product_id: Uuid,
    pub quantity: i64,
    pub sold_at: DateTime<Utc>,
}

/// Request body for recording a sale
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    #[validate(range(min = 1))]
    pub quantity: i64,
    /// Defaults to now
    #[serde(default)]
    pub sold_at: Option<DateTime<Utc>>,
}

/// Inclusive range with independently optional bounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Both bounds set with `min > max`
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

/// Which timestamp a date range applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum DateField {
    #[default]
    CreatedAt,
    LastUpdated,
}

/// Inclusive date range over a product timestamp
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub field: DateField,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn contains(&self, product: &Product) -> bool {
        let stamp = match self.field {
            DateField::CreatedAt => product.created_at,
            DateField::LastUpdated => product.last_updated,
        };
        self.start_date.is_none_or(|start| stamp >= start)
            && self.end_date.is_none_or(|end| stamp <= end)
    }
}

/// Multi-criteria filter; every field is optional and absent means "no constraint"
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<StockStatus>,
    #[serde(default)]
    pub price: Range<f64>,
    #[serde(default)]
    pub quantity: Range<i64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// Combine two criteria field by field; fields set on `other` win
    pub fn merge(self, other: FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            search: other.search.or(self.search),
            category: other.category.or(self.category),
            status: other.status.or(self.status),
            price: Range {
                min: other.price.min.or(self.price.min),
                max: other.price.max.or(self.price.max),
            },
            quantity: Range {
                min: other.quantity.min.or(self.quantity.min),
                max: other.quantity.max.or(self.quantity.max),
            },
            supplier: other.supplier.or(self.supplier),
            location: other.location.or(self.location),
            date_range: DateRange {
                start_date: other.date_range.start_date.or(self.date_range.start_date),
                end_date: other.date_range.end_date.or(self.date_range.end_date),
                field: if other.date_range.is_unbounded() {
                    self.date_range.field
                } else {
                    other.date_range.field
                },
            },
        }
    }
}

/// Fields products can be sorted by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortField {
    #[default]
    Name,
    Sku,
    Category,
    Supplier,
    Location,
    Price,
    Cost,
    Quantity,
    Status,
    CreatedAt,
    LastUpdated,
    /// price × quantity
    Value,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Keys products can be grouped or distributed by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupKey {
    Category,
    Status,
    Supplier,
    Location,
}

/// One page of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Everything a list screen asks for in one go
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub criteria: FilterCriteria,
    pub sort: Option<SortConfig>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Flat query-string form of [`ListRequest`]
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Free-text search over name, description, SKU, category, supplier and barcode
    pub search: Option<String>,
    /// Category, or "all"
    pub category: Option<String>,
    /// out_of_stock | low_stock | available | all
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// createdAt (default) or lastUpdated
    pub date_field: Option<DateField>,
    pub sort_by: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
    /// 1-indexed
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl From<ListQuery> for ListRequest {
    fn from(q: ListQuery) -> Self {
        // Unknown status strings behave like "all"
        let status = q
            .status
            .filter(|s| !s.eq_ignore_ascii_case(ALL_SENTINEL))
            .and_then(|s| s.parse::<StockStatus>().ok());

        ListRequest {
            criteria: FilterCriteria {
                search: q.search,
                category: q.category,
                status,
                price: Range::new(q.min_price, q.max_price),
                quantity: Range::new(q.min_quantity, q.max_quantity),
                supplier: q.supplier,
                location: q.location,
                date_range: DateRange {
                    start_date: q.start_date,
                    end_date: q.end_date,
                    field: q.date_field.unwrap_or_default(),
                },
            },
            sort: q.sort_by.map(|field| SortConfig {
                field,
                direction: q.sort_direction.unwrap_or_default(),
            }),
            page: q.page,
            page_size: q.page_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ThresholdQuery {
    /// Defaults to the configured low-stock threshold
    pub threshold: Option<i64>,
}
