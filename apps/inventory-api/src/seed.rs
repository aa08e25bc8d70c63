//! Demo catalogue for local runs

use domain_inventory::ProductDraft;

struct Demo {
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    supplier: &'static str,
    location: &'static str,
    price: f64,
    cost: f64,
    quantity: i64,
    min_stock: i64,
    max_stock: i64,
    barcode: &'static str,
}

const DEMO: [Demo; 10] = [
    Demo { sku: "HER-0001", name: "Martillo carpintero 16oz", category: "Herramientas", supplier: "Ferretería Central", location: "A-01", price: 12990.0, cost: 7800.0, quantity: 25, min_stock: 10, max_stock: 60, barcode: "7801234500011" },
    Demo { sku: "HER-0002", name: "Alicate universal 8\"", category: "Herramientas", supplier: "Ferretería Central", location: "A-02", price: 6990.0, cost: 3900.0, quantity: 4, min_stock: 8, max_stock: 40, barcode: "7801234500028" },
    Demo { sku: "HER-0003", name: "Set destornilladores 6 piezas", category: "Herramientas", supplier: "Importadora Sur", location: "A-03", price: 9990.0, cost: 5500.0, quantity: 18, min_stock: 5, max_stock: 30, barcode: "7801234500035" },
    Demo { sku: "PIN-0001", name: "Látex interior blanco 1 gal", category: "Pinturas", supplier: "Pinturas Andes", location: "B-01", price: 15990.0, cost: 9800.0, quantity: 32, min_stock: 12, max_stock: 80, barcode: "7801234500042" },
    Demo { sku: "PIN-0002", name: "Brocha 2\"", category: "Pinturas", supplier: "Pinturas Andes", location: "B-02", price: 2490.0, cost: 1100.0, quantity: 0, min_stock: 20, max_stock: 100, barcode: "7801234500059" },
    Demo { sku: "ELE-0001", name: "Ampolleta LED 9W", category: "Electricidad", supplier: "Eléctrica Norte", location: "C-01", price: 1990.0, cost: 850.0, quantity: 140, min_stock: 50, max_stock: 300, barcode: "7801234500066" },
    Demo { sku: "ELE-0002", name: "Cable eléctrico 2.5mm 100m", category: "Electricidad", supplier: "Eléctrica Norte", location: "C-02", price: 54990.0, cost: 38000.0, quantity: 7, min_stock: 3, max_stock: 15, barcode: "7801234500073" },
    Demo { sku: "FIJ-0001", name: "Tornillo volcanita 6x1 (caja 100)", category: "Fijaciones", supplier: "Importadora Sur", location: "D-01", price: 3490.0, cost: 1600.0, quantity: 85, min_stock: 30, max_stock: 200, barcode: "7801234500080" },
    Demo { sku: "FIJ-0002", name: "Tarugo plástico 8mm (bolsa 50)", category: "Fijaciones", supplier: "Importadora Sur", location: "D-02", price: 1290.0, cost: 500.0, quantity: 9, min_stock: 25, max_stock: 150, barcode: "7801234500097" },
    Demo { sku: "JAR-0001", name: "Manguera jardín 15m", category: "Jardín", supplier: "Agro Maule", location: "E-01", price: 11990.0, cost: 6900.0, quantity: 14, min_stock: 6, max_stock: 40, barcode: "7801234500103" },
];

pub fn demo_catalogue() -> Vec<ProductDraft> {
    DEMO.iter()
        .map(|d| ProductDraft {
            sku: d.sku.to_string(),
            name: d.name.to_string(),
            category: Some(d.category.to_string()),
            supplier: Some(d.supplier.to_string()),
            location: Some(d.location.to_string()),
            price: d.price,
            cost: d.cost,
            quantity: d.quantity,
            min_stock: d.min_stock,
            max_stock: d.max_stock,
            barcode: Some(d.barcode.to_string()),
            ..Default::default()
        })
        .collect()
}
