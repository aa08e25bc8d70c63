//! Field and form validation for product data.
//!
//! The predicates return a [`ValidationResult`] carrying the message the UI
//! shows next to the field. The `validator` derives on the DTOs cover the API
//! boundary; [`validate_product`] adds the cross-field rules and collects one
//! message per field for forms.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ProductDraft;

pub static SKU_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid SKU regex"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

static BARCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8,14}$").expect("valid barcode regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

pub fn required(value: &str, field: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::fail(format!("{field} es obligatorio"))
    } else {
        ValidationResult::ok()
    }
}

pub fn min_length(value: &str, min: usize, field: &str) -> ValidationResult {
    if value.trim().chars().count() < min {
        ValidationResult::fail(format!("{field} debe tener al menos {min} caracteres"))
    } else {
        ValidationResult::ok()
    }
}

pub fn max_length(value: &str, max: usize, field: &str) -> ValidationResult {
    if value.trim().chars().count() > max {
        ValidationResult::fail(format!("{field} no puede superar {max} caracteres"))
    } else {
        ValidationResult::ok()
    }
}

pub fn email(value: &str) -> ValidationResult {
    if EMAIL_PATTERN.is_match(value.trim()) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail("Correo electrónico inválido")
    }
}

pub fn sku(value: &str) -> ValidationResult {
    let value = value.trim();
    if value.is_empty() {
        return ValidationResult::fail("El SKU es obligatorio");
    }
    let len = value.chars().count();
    if !(3..=50).contains(&len) {
        return ValidationResult::fail("El SKU debe tener entre 3 y 50 caracteres");
    }
    if !SKU_PATTERN.is_match(value) {
        return ValidationResult::fail(
            "El SKU solo puede contener letras, números, guiones y guiones bajos",
        );
    }
    ValidationResult::ok()
}

/// Empty barcodes are allowed; otherwise 8 to 14 digits (EAN-8 up to GTIN-14)
pub fn barcode(value: &str) -> ValidationResult {
    let value = value.trim();
    if value.is_empty() || BARCODE_PATTERN.is_match(value) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail("El código de barras debe tener entre 8 y 14 dígitos")
    }
}

pub fn price(value: f64) -> ValidationResult {
    if !value.is_finite() {
        ValidationResult::fail("El precio debe ser un número válido")
    } else if value < 0.0 {
        ValidationResult::fail("El precio no puede ser negativo")
    } else {
        ValidationResult::ok()
    }
}

pub fn quantity(value: i64) -> ValidationResult {
    if value < 0 {
        ValidationResult::fail("La cantidad no puede ser negativa")
    } else {
        ValidationResult::ok()
    }
}

pub fn positive_number(value: f64, field: &str) -> ValidationResult {
    if value.is_finite() && value > 0.0 {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(format!("{field} debe ser mayor que cero"))
    }
}

/// A `max_stock` of zero means "no maximum"
pub fn stock_range(min_stock: i64, max_stock: i64) -> ValidationResult {
    if min_stock < 0 || max_stock < 0 {
        ValidationResult::fail("Los niveles de stock no pueden ser negativos")
    } else if max_stock > 0 && min_stock > max_stock {
        ValidationResult::fail("El stock mínimo no puede superar al máximo")
    } else {
        ValidationResult::ok()
    }
}

/// Outcome of validating a whole form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormValidation {
    pub is_valid: bool,
    /// First failing message per field
    pub errors: BTreeMap<String, String>,
}

impl FormValidation {
    fn check(&mut self, field: &str, result: ValidationResult) {
        if !result.is_valid && !self.errors.contains_key(field) {
            self.errors.insert(field.to_string(), result.message);
        }
    }
}

/// Validate a product form, collecting the first error per field
pub fn validate_product(draft: &ProductDraft) -> FormValidation {
    let mut form = FormValidation::default();

    form.check("sku", sku(&draft.sku));
    form.check("name", required(&draft.name, "El nombre"));
    form.check("name", max_length(&draft.name, 200, "El nombre"));
    form.check("price", price(draft.price));
    form.check("cost", price(draft.cost));
    if draft.cost > draft.price && draft.price > 0.0 {
        tracing::debug!(sku = %draft.sku, "Cost above sale price");
    }
    form.check("quantity", quantity(draft.quantity));
    form.check("minStock", stock_range(draft.min_stock, draft.max_stock));
    if let Some(code) = &draft.barcode {
        form.check("barcode", barcode(code));
    }
    if let Some(weight) = draft.weight {
        form.check("weight", positive_number(weight, "El peso"));
    }

    form.is_valid = form.errors.is_empty();
    form
}
