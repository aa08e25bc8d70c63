//! Product builders shared by the unit tests

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Product, StockStatus};

pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    pub fn new(sku: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            product: Product {
                id: Uuid::now_v7(),
                sku: sku.to_string(),
                name: name.to_string(),
                description: None,
                category: None,
                supplier: None,
                location: None,
                price: 0.0,
                cost: 0.0,
                quantity: 0,
                min_stock: 0,
                max_stock: 0,
                status: StockStatus::OutOfStock,
                barcode: None,
                weight: None,
                dimensions: None,
                created_at: now,
                last_updated: now,
            },
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.product.category = Some(category.to_string());
        self
    }

    pub fn supplier(mut self, supplier: &str) -> Self {
        self.product.supplier = Some(supplier.to_string());
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.product.location = Some(location.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.product.description = Some(description.to_string());
        self
    }

    pub fn barcode(mut self, barcode: &str) -> Self {
        self.product.barcode = Some(barcode.to_string());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.product.price = price;
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.product.cost = cost;
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.product.quantity = quantity;
        self
    }

    pub fn min_stock(mut self, min_stock: i64) -> Self {
        self.product.min_stock = min_stock;
        self
    }

    pub fn max_stock(mut self, max_stock: i64) -> Self {
        self.product.max_stock = max_stock;
        self
    }

    pub fn build(mut self) -> Product {
        self.product.refresh_status();
        self.product
    }
}

/// Minimal product: name doubles as SKU
pub fn product(name: &str, price: f64, quantity: i64) -> Product {
    ProductBuilder::new(name, name)
        .price(price)
        .quantity(quantity)
        .build()
}
