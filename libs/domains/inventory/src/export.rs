//! Serialise product lists and reports to CSV, JSON and HTML.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::calculations::AbcAnalysis;
use crate::error::{InventoryError, InventoryResult};
use crate::format::Formatter;
use crate::models::Product;

const PRODUCT_HEADERS: [&str; 14] = [
    "SKU",
    "Nombre",
    "Descripción",
    "Categoría",
    "Proveedor",
    "Ubicación",
    "Precio",
    "Costo",
    "Cantidad",
    "Stock mínimo",
    "Stock máximo",
    "Estado",
    "Código de barras",
    "Última actualización",
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

pub fn export_products(
    products: &[Product],
    format: ExportFormat,
    formatter: &Formatter,
) -> InventoryResult<String> {
    let output = match format {
        ExportFormat::Csv => products_csv(products)?,
        ExportFormat::Json => serde_json::to_string_pretty(products)?,
        ExportFormat::Html => products_html(products, formatter),
    };
    tracing::debug!(format = %format, rows = products.len(), bytes = output.len(), "Export rendered");
    Ok(output)
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> InventoryResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| InventoryError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| InventoryError::Export(e.to_string()))
}

fn products_csv(products: &[Product]) -> InventoryResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PRODUCT_HEADERS)?;

    for p in products {
        writer.write_record([
            p.sku.clone(),
            p.name.clone(),
            opt(&p.description).to_string(),
            opt(&p.category).to_string(),
            opt(&p.supplier).to_string(),
            opt(&p.location).to_string(),
            p.price.to_string(),
            p.cost.to_string(),
            p.quantity.to_string(),
            p.min_stock.to_string(),
            p.max_stock.to_string(),
            p.stock_status().label().to_string(),
            opt(&p.barcode).to_string(),
            p.last_updated.to_rfc3339(),
        ])?;
    }

    finish_csv(writer)
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn products_html(products: &[Product], formatter: &Formatter) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Reporte de inventario</title>\n</head>\n<body>\n<h1>Reporte de inventario</h1>\n",
    );
    html.push_str(&format!("<p>Total de productos: {}</p>\n", products.len()));
    html.push_str("<table>\n<thead>\n<tr>");
    for header in ["SKU", "Nombre", "Categoría", "Precio", "Cantidad", "Estado", "Valor"] {
        html.push_str(&format!("<th>{header}</th>"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for p in products {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&p.sku),
            escape_html(&p.name),
            escape_html(opt(&p.category)),
            formatter.currency(p.price),
            formatter.number(p.quantity as f64, 0),
            p.stock_status().label(),
            formatter.currency(p.value()),
        ));
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// ABC table as CSV, one row per ranked product
pub fn export_abc_report(analysis: &AbcAnalysis) -> InventoryResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["SKU", "Nombre", "Valor", "Porcentaje", "Acumulado", "Clase"])?;

    for item in &analysis.items {
        writer.write_record([
            item.sku.clone(),
            item.name.clone(),
            format!("{:.2}", item.value),
            format!("{:.2}", item.percentage),
            format!("{:.2}", item.cumulative_percentage),
            item.class.to_string(),
        ])?;
    }

    finish_csv(writer)
}
