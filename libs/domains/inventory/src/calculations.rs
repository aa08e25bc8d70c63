//! Inventory analytics: totals, distributions, ABC classification and stock projection.
//!
//! Like the filters, these never fail. Empty or degenerate input gives zeroed
//! results instead of NaN or a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::filters::{get_low_stock_products, get_reorder_candidates, group_label, unique_values};
use crate::models::{GroupKey, Product, SaleRecord};

/// Cumulative share (inclusive) that closes band A
pub const ABC_A_THRESHOLD: f64 = 80.0;
/// Cumulative share (inclusive) that closes band B
pub const ABC_B_THRESHOLD: f64 = 95.0;

/// Days of cover under which a product is urgent
pub const URGENT_DAYS: u64 = 7;
/// Days of cover under which a product needs attention
pub const ATTENTION_DAYS: u64 = 30;

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: i64,
    /// Σ price × quantity
    pub total_value: f64,
    /// Σ cost × quantity
    pub total_cost: f64,
    pub potential_profit: f64,
    pub average_price: f64,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub category_count: usize,
}

pub fn total_inventory_value(products: &[Product]) -> f64 {
    products.iter().map(Product::value).sum()
}

pub fn total_inventory_cost(products: &[Product]) -> f64 {
    products.iter().map(Product::cost_value).sum()
}

pub fn inventory_summary(products: &[Product], low_stock_threshold: i64) -> InventorySummary {
    let total_value = total_inventory_value(products);
    let total_cost = total_inventory_cost(products);
    let average_price = if products.is_empty() {
        0.0
    } else {
        products.iter().map(|p| p.price).sum::<f64>() / products.len() as f64
    };

    InventorySummary {
        total_products: products.len(),
        total_units: products.iter().map(|p| p.quantity).sum(),
        total_value,
        total_cost,
        potential_profit: total_value - total_cost,
        average_price,
        low_stock_count: get_low_stock_products(products, low_stock_threshold).len(),
        out_of_stock_count: products.iter().filter(|p| p.quantity <= 0).count(),
        category_count: unique_values(products, GroupKey::Category).len(),
    }
}

/// Margin over sale price, in percent; 0 for unpriced products
pub fn profit_margin(product: &Product) -> f64 {
    if product.price > 0.0 {
        (product.price - product.cost) / product.price * 100.0
    } else {
        0.0
    }
}

/// One bucket of a distribution
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
    /// Share of the total, by count or by value depending on the report
    pub percentage: f64,
    /// Σ price × quantity of the bucket
    pub value: f64,
}

fn buckets(products: &[Product], key: GroupKey) -> Vec<DistributionEntry> {
    let mut entries: Vec<DistributionEntry> = Vec::new();
    for product in products {
        let label = group_label(product, key);
        match entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                entry.count += 1;
                entry.value += product.value();
            }
            None => entries.push(DistributionEntry {
                label,
                count: 1,
                percentage: 0.0,
                value: product.value(),
            }),
        }
    }
    entries
}

/// Count and share per bucket, largest count first
pub fn distribution(products: &[Product], key: GroupKey) -> Vec<DistributionEntry> {
    let total = products.len() as f64;
    let mut entries = buckets(products, key);
    for entry in &mut entries {
        entry.percentage = share(entry.count as f64, total);
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Value and value share per bucket, largest value first
pub fn value_distribution(products: &[Product], key: GroupKey) -> Vec<DistributionEntry> {
    let total = total_inventory_value(products);
    let mut entries = buckets(products, key);
    for entry in &mut entries {
        entry.percentage = share(entry.value, total);
    }
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries
}

/// ABC value band
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    fn for_cumulative(cumulative: f64) -> Self {
        if cumulative <= ABC_A_THRESHOLD {
            AbcClass::A
        } else if cumulative <= ABC_B_THRESHOLD {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub value: f64,
    /// Share of total inventory value
    pub percentage: f64,
    pub cumulative_percentage: f64,
    pub class: AbcClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcBand {
    pub class: AbcClass,
    pub count: usize,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AbcAnalysis {
    pub total_value: f64,
    /// Ranked by value, highest first; ties keep input order
    pub items: Vec<AbcItem>,
    /// Always A, B, C in that order
    pub bands: Vec<AbcBand>,
}

impl AbcAnalysis {
    pub fn items_in(&self, class: AbcClass) -> impl Iterator<Item = &AbcItem> {
        self.items.iter().filter(move |i| i.class == class)
    }
}

/// Classify products into A/B/C bands by cumulative share of inventory value.
///
/// Negative values (oversold stock) count as zero. With a total value of zero
/// every product lands in C with 0 % shares. A lone product with any value is A.
pub fn abc_analysis(products: &[Product]) -> AbcAnalysis {
    let mut ranked: Vec<(&Product, f64)> = products.iter().map(|p| (p, p.value().max(0.0))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total_value: f64 = ranked.iter().map(|(_, v)| v).sum();
    let lone = ranked.len() == 1;
    let mut cumulative_value = 0.0;

    let items: Vec<AbcItem> = ranked
        .into_iter()
        .map(|(product, value)| {
            cumulative_value += value;
            let cumulative_percentage = share(cumulative_value, total_value);
            let class = if total_value <= 0.0 {
                AbcClass::C
            } else if lone {
                AbcClass::A
            } else {
                AbcClass::for_cumulative(cumulative_percentage)
            };

            AbcItem {
                product_id: product.id,
                sku: product.sku.clone(),
                name: product.name.clone(),
                value,
                percentage: share(value, total_value),
                cumulative_percentage,
                class,
            }
        })
        .collect();

    let bands = [AbcClass::A, AbcClass::B, AbcClass::C]
        .into_iter()
        .map(|class| {
            let (count, value) = items
                .iter()
                .filter(|i| i.class == class)
                .fold((0, 0.0), |(n, v), i| (n + 1, v + i.value));
            AbcBand {
                class,
                count,
                value,
                percentage: share(value, total_value),
            }
        })
        .collect();

    tracing::debug!(products = products.len(), total_value, "ABC analysis computed");

    AbcAnalysis {
        total_value,
        items,
        bands,
    }
}

/// How many days of stock remain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
pub enum ProjectionStatus {
    #[serde(rename = "Urgente")]
    #[strum(serialize = "Urgente")]
    Urgent,
    #[serde(rename = "Atención")]
    #[strum(serialize = "Atención")]
    Attention,
    #[serde(rename = "Estable")]
    #[strum(serialize = "Estable")]
    Stable,
}

impl ProjectionStatus {
    pub fn for_days(days_remaining: Option<u64>) -> Self {
        match days_remaining {
            Some(days) if days < URGENT_DAYS => ProjectionStatus::Urgent,
            Some(days) if days < ATTENTION_DAYS => ProjectionStatus::Attention,
            _ => ProjectionStatus::Stable,
        }
    }
}

/// What the daily average is taken over
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProjectionBasis {
    /// Units sold divided by the number of sale records
    #[default]
    PerSaleRecord,
    /// Units sold divided by calendar days since the first sale
    CalendarDays,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockProjection {
    pub product_id: Uuid,
    pub current_stock: i64,
    pub total_sold: i64,
    pub sale_records: usize,
    pub daily_average: f64,
    /// `None` when nothing is selling
    pub days_remaining: Option<u64>,
    pub status: ProjectionStatus,
    pub basis: ProjectionBasis,
}

/// Project remaining days of stock from sales history, averaging per sale record
pub fn project_stock(product: &Product, sales: &[SaleRecord]) -> StockProjection {
    project_stock_with(product, sales, ProjectionBasis::PerSaleRecord, Utc::now())
}

/// Project remaining days of stock with an explicit averaging basis.
///
/// Only positive sales of this product are counted.
pub fn project_stock_with(
    product: &Product,
    sales: &[SaleRecord],
    basis: ProjectionBasis,
    now: DateTime<Utc>,
) -> StockProjection {
    let relevant: Vec<&SaleRecord> = sales
        .iter()
        .filter(|s| s.product_id == product.id && s.quantity > 0)
        .collect();
    let total_sold: i64 = relevant.iter().map(|s| s.quantity).sum();

    let divisor = match basis {
        ProjectionBasis::PerSaleRecord => relevant.len().max(1) as f64,
        ProjectionBasis::CalendarDays => relevant
            .iter()
            .map(|s| s.sold_at)
            .min()
            .map(|first| ((now - first).num_days() + 1).max(1) as f64)
            .unwrap_or(1.0),
    };
    let daily_average = total_sold as f64 / divisor;

    let days_remaining = if daily_average > 0.0 {
        Some((product.quantity.max(0) as f64 / daily_average).floor() as u64)
    } else {
        None
    };

    StockProjection {
        product_id: product.id,
        current_stock: product.quantity,
        total_sold,
        sale_records: relevant.len(),
        daily_average,
        days_remaining,
        status: ProjectionStatus::for_days(days_remaining),
        basis,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSuggestion {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub suggested_quantity: i64,
    /// suggested_quantity × cost
    pub estimated_cost: f64,
}

/// Restock proposals for products at or under their minimum, most short first
pub fn reorder_suggestions(products: &[Product]) -> Vec<ReorderSuggestion> {
    let mut candidates = get_reorder_candidates(products);
    candidates.sort_by_key(|p| p.quantity - p.min_stock);

    candidates
        .into_iter()
        .map(|p| {
            let suggested_quantity = (p.max_stock - p.quantity)
                .max(p.min_stock - p.quantity)
                .max(0);
            ReorderSuggestion {
                product_id: p.id,
                estimated_cost: suggested_quantity as f64 * p.cost,
                sku: p.sku,
                name: p.name,
                quantity: p.quantity,
                min_stock: p.min_stock,
                max_stock: p.max_stock,
                suggested_quantity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{product, ProductBuilder};
    use crate::filters::UNCATEGORIZED_LABEL;
    use chrono::Duration;

    fn sale(product: &Product, quantity: i64, days_ago: i64) -> SaleRecord {
        SaleRecord {
            product_id: product.id,
            quantity,
            sold_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_summary_totals() {
        let products = vec![
            ProductBuilder::new("A", "A").price(10.0).cost(6.0).quantity(10).category("X").build(),
            ProductBuilder::new("B", "B").price(20.0).cost(5.0).quantity(3).category("Y").build(),
            ProductBuilder::new("C", "C").price(30.0).quantity(0).build(),
        ];
        let summary = inventory_summary(&products, 10);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_units, 13);
        assert_eq!(summary.total_value, 160.0);
        assert_eq!(summary.total_cost, 75.0);
        assert_eq!(summary.potential_profit, 85.0);
        assert_eq!(summary.average_price, 20.0);
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.out_of_stock_count, 1);
        assert_eq!(summary.category_count, 2);
    }

    #[test]
    fn test_summary_of_empty_inventory() {
        let summary = inventory_summary(&[], 10);
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.average_price, 0.0);
    }

    #[test]
    fn test_profit_margin() {
        let p = ProductBuilder::new("M", "M").price(200.0).cost(150.0).build();
        assert_eq!(profit_margin(&p), 25.0);
        assert_eq!(profit_margin(&product("free", 0.0, 1)), 0.0);
    }

    #[test]
    fn test_distribution_by_count() {
        let products = vec![
            ProductBuilder::new("1", "1").category("X").price(1.0).quantity(1).build(),
            ProductBuilder::new("2", "2").category("Y").price(50.0).quantity(1).build(),
            ProductBuilder::new("3", "3").category("Y").price(1.0).quantity(1).build(),
            ProductBuilder::new("4", "4").price(1.0).quantity(1).build(),
        ];
        let dist = distribution(&products, GroupKey::Category);
        let labels: Vec<&str> = dist.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Y", "X", UNCATEGORIZED_LABEL]);
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[0].percentage, 50.0);
        assert_eq!(dist[0].value, 51.0);

        let by_value = value_distribution(&products, GroupKey::Category);
        assert_eq!(by_value[0].label, "Y");
        assert!((by_value.iter().map(|e| e.percentage).sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_by_status_and_empty() {
        let products = vec![product("a", 1.0, 0), product("b", 1.0, 0), product("c", 1.0, 50)];
        let dist = distribution(&products, GroupKey::Status);
        assert_eq!(dist[0].label, "out_of_stock");
        assert_eq!(dist[0].count, 2);
        assert!(distribution(&[], GroupKey::Status).is_empty());
        assert_eq!(value_distribution(&products[..2], GroupKey::Status)[0].percentage, 0.0);
    }

    #[test]
    fn test_abc_tie_order_is_stable() {
        let products = vec![product("p0", 10.0, 10), product("p1", 5.0, 4), product("p2", 100.0, 1)];
        let analysis = abc_analysis(&products);

        let order: Vec<&str> = analysis.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(order, ["p0", "p2", "p1"]);

        let values: Vec<f64> = analysis.items.iter().map(|i| i.value).collect();
        assert_eq!(values, [100.0, 100.0, 20.0]);

        let classes: Vec<AbcClass> = analysis.items.iter().map(|i| i.class).collect();
        assert_eq!(classes, [AbcClass::A, AbcClass::B, AbcClass::C]);
        assert_eq!(analysis.total_value, 220.0);
        assert!((analysis.items[2].cumulative_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_abc_bands_partition_input() {
        let products: Vec<Product> = (1..=20)
            .map(|i| product(&format!("p{i}"), i as f64 * 3.0, (21 - i) * 2 + i % 4))
            .collect();
        let analysis = abc_analysis(&products);

        assert_eq!(analysis.items.len(), products.len());
        let counted: usize = analysis.bands.iter().map(|b| b.count).sum();
        assert_eq!(counted, products.len());

        let mut ids: Vec<Uuid> = analysis.items.iter().map(|i| i.product_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), products.len());

        let last_a = analysis.items_in(AbcClass::A).last().unwrap();
        assert!(last_a.cumulative_percentage <= ABC_A_THRESHOLD);
        for item in analysis.items_in(AbcClass::B) {
            assert!(item.cumulative_percentage > ABC_A_THRESHOLD);
            assert!(item.cumulative_percentage <= ABC_B_THRESHOLD);
        }
        let band_total: f64 = analysis.bands.iter().map(|b| b.percentage).sum();
        assert!((band_total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_abc_single_product_is_a() {
        let analysis = abc_analysis(&[product("solo", 10.0, 3)]);
        assert_eq!(analysis.items[0].class, AbcClass::A);
        assert_eq!(analysis.items[0].cumulative_percentage, 100.0);
    }

    #[test]
    fn test_abc_zero_value_is_all_c_without_nan() {
        let products = vec![product("a", 0.0, 5), product("b", 10.0, 0), product("c", 3.0, -2)];
        let analysis = abc_analysis(&products);
        assert_eq!(analysis.total_value, 0.0);
        for item in &analysis.items {
            assert_eq!(item.class, AbcClass::C);
            assert_eq!(item.percentage, 0.0);
            assert!(!item.cumulative_percentage.is_nan());
        }
        assert_eq!(analysis.bands[2].count, 3);
        assert!(abc_analysis(&[]).items.is_empty());
    }

    #[test]
    fn test_projection_averages_per_sale_record() {
        let p = product("tornillo", 1.0, 50);
        let sales = vec![sale(&p, 4, 3), sale(&p, 6, 2), sale(&p, 5, 1)];
        let projection = project_stock(&p, &sales);
        assert_eq!(projection.total_sold, 15);
        assert_eq!(projection.sale_records, 3);
        assert_eq!(projection.daily_average, 5.0);
        assert_eq!(projection.days_remaining, Some(10));
        assert_eq!(projection.status, ProjectionStatus::Attention);
    }

    #[test]
    fn test_projection_status_thresholds() {
        assert_eq!(ProjectionStatus::for_days(Some(0)), ProjectionStatus::Urgent);
        assert_eq!(ProjectionStatus::for_days(Some(6)), ProjectionStatus::Urgent);
        assert_eq!(ProjectionStatus::for_days(Some(7)), ProjectionStatus::Attention);
        assert_eq!(ProjectionStatus::for_days(Some(29)), ProjectionStatus::Attention);
        assert_eq!(ProjectionStatus::for_days(Some(30)), ProjectionStatus::Stable);
        assert_eq!(ProjectionStatus::for_days(None), ProjectionStatus::Stable);
        assert_eq!(ProjectionStatus::Attention.to_string(), "Atención");
    }

    #[test]
    fn test_projection_without_sales_is_unbounded() {
        let p = product("quieto", 1.0, 5);
        let other = product("otro", 1.0, 5);
        let projection = project_stock(&p, &[sale(&other, 10, 1)]);
        assert_eq!(projection.daily_average, 0.0);
        assert_eq!(projection.days_remaining, None);
        assert_eq!(projection.status, ProjectionStatus::Stable);
    }

    #[test]
    fn test_projection_calendar_days_basis() {
        let p = product("clavo", 1.0, 20);
        let now = Utc::now();
        let sales = vec![
            SaleRecord {
                product_id: p.id,
                quantity: 10,
                sold_at: now - Duration::days(9),
            },
            SaleRecord {
                product_id: p.id,
                quantity: 10,
                sold_at: now,
            },
        ];
        let projection = project_stock_with(&p, &sales, ProjectionBasis::CalendarDays, now);
        assert_eq!(projection.daily_average, 2.0);
        assert_eq!(projection.days_remaining, Some(10));
    }

    #[test]
    fn test_projection_out_of_stock_is_urgent() {
        let p = product("agotado", 1.0, 0);
        let projection = project_stock(&p, &[sale(&p, 2, 1)]);
        assert_eq!(projection.days_remaining, Some(0));
        assert_eq!(projection.status, ProjectionStatus::Urgent);
    }

    #[test]
    fn test_reorder_suggestions() {
        let products = vec![
            ProductBuilder::new("A", "A").quantity(4).min_stock(5).max_stock(20).cost(2.0).build(),
            ProductBuilder::new("B", "B").quantity(0).min_stock(10).build(),
            ProductBuilder::new("C", "C").quantity(50).min_stock(5).max_stock(60).build(),
        ];
        let suggestions = reorder_suggestions(&products);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].sku, "B");
        assert_eq!(suggestions[0].suggested_quantity, 10);
        assert_eq!(suggestions[1].suggested_quantity, 16);
        assert_eq!(suggestions[1].estimated_cost, 32.0);
    }
}
