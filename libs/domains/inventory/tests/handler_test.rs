//! Handler tests for the Inventory domain
//!
//! These drive the router with in-process requests against an in-memory
//! repository and check:
//! - Request deserialization and validation
//! - Response serialization
//! - HTTP status codes
//! - Error bodies

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use domain_inventory::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn app() -> Router {
    handlers::router(InventoryService::new(LocalProductRepository::in_memory()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Seed through the service so every test starts from the same catalogue
async fn seeded_app() -> (Router, Vec<Product>) {
    let service = InventoryService::new(LocalProductRepository::in_memory());
    let drafts = [
        ("HER-001", "Martillo", Some("Herramientas"), 12990.0, 25),
        ("HER-002", "Alicate", Some("Herramientas"), 6990.0, 4),
        ("PIN-001", "Brocha", Some("Pinturas"), 2490.0, 0),
        ("FER-001", "Tornillos", None, 990.0, 300),
    ];
    let mut products = Vec::new();
    for (sku, name, category, price, quantity) in drafts {
        let product = service
            .create_product(ProductDraft {
                sku: sku.into(),
                name: name.into(),
                category: category.map(String::from),
                price,
                cost: price / 2.0,
                quantity,
                min_stock: 5,
                max_stock: 50,
                ..Default::default()
            })
            .await
            .unwrap();
        products.push(product);
    }
    (handlers::router(service), products)
}

#[tokio::test]
async fn test_create_product_returns_201() {
    let request = post_json(
        "/",
        json!({
            "sku": "HER-010",
            "name": "Llave inglesa",
            "price": 8990.0,
            "quantity": 12,
            "category": "Herramientas"
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.sku, "HER-010");
    assert_eq!(product.status, StockStatus::Available);
}

#[tokio::test]
async fn test_create_product_validates_input() {
    let request = post_json(
        "/",
        json!({
            "sku": "a b",
            "name": "",
            "price": -1.0
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], 400);
    assert!(body["details"]["sku"].is_array());
    assert!(body["details"]["price"].is_array());
}

#[tokio::test]
async fn test_create_product_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"sku\":"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_sku_returns_409() {
    let (app, _) = seeded_app().await;
    let request = post_json(
        "/",
        json!({ "sku": "her-001", "name": "Otro martillo", "price": 1.0 }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_get_product_by_id_sku_and_missing() {
    let (app, products) = seeded_app().await;
    let id = products[0].id;

    let response = app.clone().oneshot(get(&format!("/{id}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.name, "Martillo");

    let response = app.clone().oneshot(get("/sku/PIN-001")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/{}", uuid::Uuid::now_v7())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_products_filters_sorts_and_paginates() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(get(
            "/?category=Herramientas&sortBy=price&sortDirection=desc&page=1&pageSize=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page: Page<Product> = json_body(response.into_body()).await;
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);
    assert!(!page.has_prev);
    assert_eq!(page.items[0].sku, "HER-001");
}

#[tokio::test]
async fn test_list_products_status_all_means_no_constraint() {
    let (app, _) = seeded_app().await;

    let response = app.oneshot(get("/?status=all")).await.unwrap();
    let page: Page<Product> = json_body(response.into_body()).await;
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn test_list_products_inverted_range_is_400() {
    let (app, _) = seeded_app().await;

    let response = app
        .oneshot(get("/?minPrice=5000&maxPrice=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_adjust_stock_and_overdraw() {
    let (app, products) = seeded_app().await;
    let id = products[1].id;

    let request = post_json(
        &format!("/{id}/stock"),
        json!({ "quantity": 10, "reason": "Reposición" }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let product: Product = json_body(response.into_body()).await;
    assert_eq!(product.quantity, 14);
    assert_eq!(product.status, StockStatus::Available);

    let request = post_json(
        &format!("/{id}/stock"),
        json!({ "quantity": -100, "reason": "Merma" }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sales_feed_projection() {
    let (app, products) = seeded_app().await;
    let id = products[0].id;

    for quantity in [2, 4] {
        let request = post_json(&format!("/{id}/sales"), json!({ "quantity": quantity }));
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get(&format!("/{id}/projection")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let projection: Value = json_body(response.into_body()).await;
    assert_eq!(projection["currentStock"], 19);
    assert_eq!(projection["totalSold"], 6);
    assert_eq!(projection["dailyAverage"], 3.0);
    assert_eq!(projection["daysRemaining"], 6);
    assert_eq!(projection["status"], "Urgente");

    let request = post_json(&format!("/{id}/sales"), json!({ "quantity": 500 }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_low_and_out_of_stock() {
    let (app, _) = seeded_app().await;

    let response = app.clone().oneshot(get("/low-stock")).await.unwrap();
    let low: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].sku, "HER-002");

    let response = app.clone().oneshot(get("/low-stock?threshold=30")).await.unwrap();
    let low: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(low.len(), 2);

    let response = app.oneshot(get("/out-of-stock")).await.unwrap();
    let out: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(out[0].sku, "PIN-001");
}

#[tokio::test]
async fn test_groups_and_unknown_key() {
    let (app, _) = seeded_app().await;

    let response = app.clone().oneshot(get("/groups/category")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let groups: Value = json_body(response.into_body()).await;
    let labels: Vec<&str> = groups
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["Herramientas", "Pinturas", "Sin categoría"]);

    let response = app.oneshot(get("/groups/color")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let (app, _) = seeded_app().await;

    let response = app.clone().oneshot(get("/analytics/summary")).await.unwrap();
    let summary: Value = json_body(response.into_body()).await;
    assert_eq!(summary["totalProducts"], 4);
    assert_eq!(summary["outOfStockCount"], 1);

    let response = app.clone().oneshot(get("/analytics/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let abc: Value = json_body(response.into_body()).await;
    assert_eq!(abc["items"].as_array().unwrap().len(), 4);
    assert_eq!(abc["bands"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get("/analytics/distribution/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/analytics/reorder")).await.unwrap();
    let reorder: Value = json_body(response.into_body()).await;
    let skus: Vec<&str> = reorder
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, ["PIN-001", "HER-002"]);
}

#[tokio::test]
async fn test_export_formats() {
    let (app, _) = seeded_app().await;

    let response = app.clone().oneshot(get("/export/csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let csv = text_body(response.into_body()).await;
    assert_eq!(csv.lines().count(), 5);

    let response = app
        .clone()
        .oneshot(get("/export/html?category=Pinturas"))
        .await
        .unwrap();
    let html = text_body(response.into_body()).await;
    assert!(html.contains("Brocha"));
    assert!(!html.contains("Martillo"));

    let response = app.oneshot(get("/export/xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutations_publish_notifications() {
    let (app, products) = seeded_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", products[3].id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/notifications")).await.unwrap();
    let notifications: Vec<Notification> = json_body(response.into_body()).await;
    let last = notifications.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Success);
    assert_eq!(last.title, "Producto eliminado");
    assert!(notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Warning && n.title == "Stock bajo"));
}

#[tokio::test]
async fn test_validate_form_lists_field_messages() {
    let (app, _) = seeded_app().await;
    let request = post_json(
        "/validate",
        json!({
            "sku": "HER-001",
            "name": "",
            "price": 1990.0,
            "barcode": "12ab"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let form: Value = json_body(response.into_body()).await;
    assert_eq!(form["isValid"], false);
    assert!(form["errors"]["sku"].is_string());
    assert!(form["errors"]["name"].is_string());
    assert!(form["errors"]["barcode"].is_string());
}

#[tokio::test]
async fn test_validate_form_accepts_new_product() {
    let (app, _) = seeded_app().await;
    let request = post_json(
        "/validate",
        json!({
            "sku": "HER-099",
            "name": "Serrucho",
            "price": 7990.0,
            "quantity": 3
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let form: Value = json_body(response.into_body()).await;
    assert_eq!(form["isValid"], true);
    assert_eq!(form["errors"], json!({}));
}
