//! Client-side filtering, grouping, sorting and pagination over product lists.
//!
//! Every function here is pure: it borrows its input and returns freshly
//! allocated results, so list screens can call them on every refresh.

use std::cmp::Ordering;

use serde::Serialize;
use strum::Display;
use utoipa::ToSchema;

use crate::models::{
    FilterCriteria, GroupKey, Page, Product, SortDirection, SortField, ALL_SENTINEL,
};

/// Bucket label for products without a category
pub const UNCATEGORIZED_LABEL: &str = "Sin categoría";

/// Bucket label for products without a supplier or location
pub const UNKNOWN_LABEL: &str = "Desconocido";

/// Pipeline stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    Search,
    Category,
    Status,
    PriceRange,
    QuantityRange,
    Supplier,
    Location,
    DateRange,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 8] = [
        FilterStage::Search,
        FilterStage::Category,
        FilterStage::Status,
        FilterStage::PriceRange,
        FilterStage::QuantityRange,
        FilterStage::Supplier,
        FilterStage::Location,
        FilterStage::DateRange,
    ];

    fn is_active(&self, criteria: &FilterCriteria) -> bool {
        match self {
            FilterStage::Search => active_text(&criteria.search).is_some(),
            FilterStage::Category => active_text(&criteria.category).is_some(),
            FilterStage::Status => criteria.status.is_some(),
            FilterStage::PriceRange => !criteria.price.is_unbounded(),
            FilterStage::QuantityRange => !criteria.quantity.is_unbounded(),
            FilterStage::Supplier => active_text(&criteria.supplier).is_some(),
            FilterStage::Location => active_text(&criteria.location).is_some(),
            FilterStage::DateRange => !criteria.date_range.is_unbounded(),
        }
    }

    fn apply(&self, products: Vec<Product>, criteria: &FilterCriteria) -> Vec<Product> {
        match self {
            FilterStage::Search => {
                let term = active_text(&criteria.search).unwrap_or_default().to_lowercase();
                retain(products, |p| matches_search(p, &term))
            }
            FilterStage::Category => {
                let wanted = active_text(&criteria.category).unwrap_or_default();
                retain(products, |p| text_eq(p.category.as_deref(), wanted))
            }
            FilterStage::Status => match criteria.status {
                Some(status) => retain(products, |p| p.stock_status() == status),
                None => products,
            },
            FilterStage::PriceRange => retain(products, |p| criteria.price.contains(p.price)),
            FilterStage::QuantityRange => {
                retain(products, |p| criteria.quantity.contains(p.quantity))
            }
            FilterStage::Supplier => {
                let wanted = active_text(&criteria.supplier).unwrap_or_default();
                retain(products, |p| text_eq(p.supplier.as_deref(), wanted))
            }
            FilterStage::Location => {
                let wanted = active_text(&criteria.location).unwrap_or_default();
                retain(products, |p| text_eq(p.location.as_deref(), wanted))
            }
            FilterStage::DateRange => retain(products, |p| criteria.date_range.contains(p)),
        }
    }
}

/// Result of running the pipeline, keeping "bad criteria" apart from "nothing matched"
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    Matched(Vec<Product>),
    NoMatches,
    InvalidCriteria(String),
}

impl FilterOutcome {
    /// Collapse to a plain list; invalid criteria yield an empty list
    pub fn into_products(self) -> Vec<Product> {
        match self {
            FilterOutcome::Matched(products) => products,
            FilterOutcome::NoMatches | FilterOutcome::InvalidCriteria(_) => Vec::new(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FilterOutcome::InvalidCriteria(_))
    }
}

/// Count left after one executed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageReport {
    pub stage: FilterStage,
    pub remaining: usize,
}

/// Filtered products plus the stages that actually ran
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTrace {
    pub products: Vec<Product>,
    pub stages: Vec<StageReport>,
}

/// A trimmed, non-empty value that is not the "all" sentinel
fn active_text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL))
}

fn text_eq(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.trim().to_lowercase() == wanted.to_lowercase())
}

fn retain(mut products: Vec<Product>, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
    products.retain(|p| keep(p));
    products
}

fn matches_search(product: &Product, term: &str) -> bool {
    let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(term));

    contains(Some(&product.name))
        || contains(product.description.as_deref())
        || contains(Some(&product.sku))
        || contains(product.category.as_deref())
        || contains(product.supplier.as_deref())
        || contains(product.barcode.as_deref())
}

/// Stages the criteria will execute, in pipeline order
pub fn active_stages(criteria: &FilterCriteria) -> Vec<FilterStage> {
    FilterStage::ORDER
        .into_iter()
        .filter(|stage| stage.is_active(criteria))
        .collect()
}

/// Reject criteria that cannot match by construction
pub fn validate_criteria(criteria: &FilterCriteria) -> Result<(), String> {
    let price_bounds = [criteria.price.min, criteria.price.max];
    if price_bounds.iter().flatten().any(|b| !b.is_finite()) {
        return Err("price bounds must be finite numbers".to_string());
    }
    if criteria.price.is_inverted() {
        return Err("price.min is greater than price.max".to_string());
    }
    if criteria.quantity.is_inverted() {
        return Err("quantity.min is greater than quantity.max".to_string());
    }
    if let (Some(start), Some(end)) = (criteria.date_range.start_date, criteria.date_range.end_date) {
        if start > end {
            return Err("dateRange.startDate is after dateRange.endDate".to_string());
        }
    }
    Ok(())
}

/// Run the pipeline and record how many products survived each executed stage
pub fn filter_with_trace(products: &[Product], criteria: &FilterCriteria) -> FilterTrace {
    let mut current = products.to_vec();
    let mut stages = Vec::new();

    for stage in active_stages(criteria) {
        current = stage.apply(current, criteria);
        tracing::trace!(stage = %stage, remaining = current.len(), "Filter stage applied");
        stages.push(StageReport {
            stage,
            remaining: current.len(),
        });
    }

    FilterTrace {
        products: current,
        stages,
    }
}

/// Run the pipeline, tagging malformed criteria
pub fn evaluate_filters(products: &[Product], criteria: &FilterCriteria) -> FilterOutcome {
    if let Err(reason) = validate_criteria(criteria) {
        tracing::warn!(%reason, "Rejected filter criteria");
        return FilterOutcome::InvalidCriteria(reason);
    }

    let trace = filter_with_trace(products, criteria);
    if trace.products.is_empty() {
        FilterOutcome::NoMatches
    } else {
        FilterOutcome::Matched(trace.products)
    }
}

/// Apply every active criterion; never fails, malformed criteria yield an empty list
pub fn filter_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    evaluate_filters(products, criteria).into_products()
}

/// Case-insensitive search across the text fields; a blank term returns everything
pub fn search_products(products: &[Product], term: &str) -> Vec<Product> {
    let criteria = FilterCriteria {
        search: Some(term.to_string()),
        ..Default::default()
    };
    filter_with_trace(products, &criteria).products
}

/// Products in stock but at or under `threshold`
pub fn get_low_stock_products(products: &[Product], threshold: i64) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.quantity > 0 && p.quantity <= threshold)
        .cloned()
        .collect()
}

pub fn get_out_of_stock_products(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.quantity <= 0).cloned().collect()
}

/// Products at or under their own minimum stock
pub fn get_reorder_candidates(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.min_stock > 0 && p.quantity <= p.min_stock)
        .cloned()
        .collect()
}

/// Value of `key` for a product, `None` when the field is unset or blank
pub fn group_value(product: &Product, key: GroupKey) -> Option<String> {
    let raw = match key {
        GroupKey::Category => product.category.as_deref(),
        GroupKey::Supplier => product.supplier.as_deref(),
        GroupKey::Location => product.location.as_deref(),
        GroupKey::Status => return Some(product.stock_status().to_string()),
    };
    raw.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// Label used for products whose `key` is missing
pub fn fallback_label(key: GroupKey) -> &'static str {
    match key {
        GroupKey::Category => UNCATEGORIZED_LABEL,
        _ => UNKNOWN_LABEL,
    }
}

pub(crate) fn group_label(product: &Product, key: GroupKey) -> String {
    group_value(product, key).unwrap_or_else(|| fallback_label(key).to_string())
}

/// Products sharing one key value
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductGroup {
    pub label: String,
    pub products: Vec<Product>,
}

/// Group products by `key`, keeping groups in order of first appearance
pub fn group_by(products: &[Product], key: GroupKey) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Vec::new();

    for product in products {
        let label = group_label(product, key);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(ProductGroup {
                label,
                products: vec![product.clone()],
            }),
        }
    }

    groups
}

/// Distinct, sorted values of `key` (for filter dropdowns); missing values are skipped
pub fn unique_values(products: &[Product], key: GroupKey) -> Vec<String> {
    let mut values: Vec<String> = products.iter().filter_map(|p| group_value(p, key)).collect();
    values.sort_by_key(|v| v.to_lowercase());
    values.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    values
}

fn cmp_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.unwrap_or_default().to_lowercase();
    let b = b.unwrap_or_default().to_lowercase();
    a.cmp(&b)
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Name => cmp_text(Some(&a.name), Some(&b.name)),
        SortField::Sku => cmp_text(Some(&a.sku), Some(&b.sku)),
        SortField::Category => cmp_text(a.category.as_deref(), b.category.as_deref()),
        SortField::Supplier => cmp_text(a.supplier.as_deref(), b.supplier.as_deref()),
        SortField::Location => cmp_text(a.location.as_deref(), b.location.as_deref()),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Cost => a.cost.total_cmp(&b.cost),
        SortField::Quantity => a.quantity.cmp(&b.quantity),
        SortField::Status => cmp_text(
            Some(&a.stock_status().to_string()),
            Some(&b.stock_status().to_string()),
        ),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
        SortField::Value => a.value().total_cmp(&b.value()),
    }
}

/// Stable sort into a new vector; ties keep their input order in both directions
pub fn sort_by(products: &[Product], field: SortField, direction: SortDirection) -> Vec<Product> {
    let mut sorted = products.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_by(|a, b| compare(a, b, field)),
        SortDirection::Desc => sorted.sort_by(|a, b| compare(b, a, field)),
    }
    sorted
}

/// Slice out one 1-indexed page.
///
/// Pages outside `1..=total_pages` are not clamped and come back empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    if page_size == 0 {
        return Page {
            items: Vec::new(),
            total,
            page,
            page_size,
            total_pages: 0,
            has_next: false,
            has_prev: page > 1,
        };
    }

    let total_pages = total.div_ceil(page_size);
    let page_items = if page == 0 {
        Vec::new()
    } else {
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = page.saturating_mul(page_size).min(total);
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        total,
        page,
        page_size,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}
