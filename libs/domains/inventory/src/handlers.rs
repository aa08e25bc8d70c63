//! HTTP handlers for the Inventory API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::calculations::{
    AbcAnalysis, AbcBand, AbcClass, AbcItem, DistributionEntry, InventorySummary,
    ProjectionBasis, ProjectionStatus, ReorderSuggestion, StockProjection,
};
use crate::error::{ErrorResponse, InventoryError, InventoryResult};
use crate::export::ExportFormat;
use crate::extract::{IdPath, ParsedPath, ValidatedJson};
use crate::filters::ProductGroup;
use crate::models::{
    DateField, GroupKey, ListQuery, ListRequest, NewSale, Page, Product, ProductDraft,
    ProductUpdate, SortDirection, SortField, StockAdjustment, StockStatus, ThresholdQuery,
};
use crate::notifications::{Notification, NotificationLevel};
use crate::repository::ProductRepository;
use crate::service::InventoryService;
use crate::validation::FormValidation;

/// OpenAPI documentation for the Inventory API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        check_draft,
        get_product,
        update_product,
        delete_product,
        adjust_stock,
        record_sale,
        stock_projection,
        get_by_sku,
        get_by_barcode,
        low_stock,
        out_of_stock,
        group_products,
        filter_options,
        summary,
        distribution,
        abc_analysis,
        abc_export,
        reorder_suggestions,
        export_products,
        notifications,
    ),
    components(
        schemas(
            Product, ProductDraft, ProductUpdate, StockAdjustment, NewSale, StockStatus,
            SortField, SortDirection, DateField, GroupKey, ProductGroup, InventorySummary,
            DistributionEntry, AbcAnalysis, AbcItem, AbcBand, AbcClass, StockProjection,
            ProjectionStatus, ProjectionBasis, ReorderSuggestion, ExportFormat, Notification,
            NotificationLevel, FormValidation, ErrorResponse
        )
    ),
    tags(
        (name = "Inventory", description = "Product inventory endpoints"),
        (name = "Analytics", description = "Inventory reports")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<InventoryService<R>>>;

/// Create the inventory router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: InventoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/validate", post(check_draft))
        .route("/low-stock", get(low_stock))
        .route("/out-of-stock", get(out_of_stock))
        .route("/notifications", get(notifications))
        .route("/sku/{sku}", get(get_by_sku))
        .route("/barcode/{barcode}", get(get_by_barcode))
        .route("/groups/{key}", get(group_products))
        .route("/options/{key}", get(filter_options))
        .route("/export/{format}", get(export_products))
        .route("/analytics/summary", get(summary))
        .route("/analytics/distribution/{key}", get(distribution))
        .route("/analytics/abc", get(abc_analysis))
        .route("/analytics/abc/export", get(abc_export))
        .route("/analytics/reorder", get(reorder_suggestions))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", post(adjust_stock))
        .route("/{id}/sales", post(record_sale))
        .route("/{id}/projection", get(stock_projection))
        .with_state(shared_service)
}

/// List products: filter, sort, paginate
#[utoipa::path(
    get,
    path = "",
    tag = "Inventory",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of matching products", body = Page<Product>),
        (status = 400, description = "Malformed criteria", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): SharedService<R>,
    Query(query): Query<ListQuery>,
) -> InventoryResult<Json<Page<Product>>> {
    let page = service.list_products(ListRequest::from(query)).await?;
    Ok(Json(page))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Inventory",
    request_body = ProductDraft,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "SKU already exists", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): SharedService<R>,
    ValidatedJson(input): ValidatedJson<ProductDraft>,
) -> InventoryResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Check a product form without saving it
#[utoipa::path(
    post,
    path = "/validate",
    tag = "Inventory",
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Per-field messages; empty when the form is valid", body = FormValidation),
        (status = 400, description = "Malformed JSON", body = ErrorResponse)
    )
)]
async fn check_draft<R: ProductRepository>(
    State(service): SharedService<R>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> InventoryResult<Json<FormValidation>> {
    let Json(draft) = payload.map_err(|e| InventoryError::Validation(e.body_text()))?;
    let form = service.check_draft(&draft).await?;
    Ok(Json(form))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> InventoryResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "SKU already exists", body = ErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<ProductUpdate>,
) -> InventoryResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> InventoryResult<impl IntoResponse> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add or remove stock
#[utoipa::path(
    post,
    path = "/{id}/stock",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = Product),
        (status = 400, description = "Stock would go negative", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn adjust_stock<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
    ValidatedJson(adjustment): ValidatedJson<StockAdjustment>,
) -> InventoryResult<Json<Product>> {
    let product = service.adjust_stock(id, adjustment).await?;
    Ok(Json(product))
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/{id}/sales",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = NewSale,
    responses(
        (status = 201, description = "Sale recorded, stock decremented", body = Product),
        (status = 400, description = "Not enough stock", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn record_sale<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
    ValidatedJson(sale): ValidatedJson<NewSale>,
) -> InventoryResult<impl IntoResponse> {
    let product = service.record_sale(id, sale).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Days of stock left at the current sales pace
#[utoipa::path(
    get,
    path = "/{id}/projection",
    tag = "Analytics",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Stock projection", body = StockProjection),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn stock_projection<R: ProductRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> InventoryResult<Json<StockProjection>> {
    let projection = service.stock_projection(id).await?;
    Ok(Json(projection))
}

/// Get a product by SKU
#[utoipa::path(
    get,
    path = "/sku/{sku}",
    tag = "Inventory",
    params(("sku" = String, Path, description = "Product SKU")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_by_sku<R: ProductRepository>(
    State(service): SharedService<R>,
    axum::extract::Path(sku): axum::extract::Path<String>,
) -> InventoryResult<Json<Product>> {
    let product = service.get_by_sku(&sku).await?;
    Ok(Json(product))
}

/// Get a product by barcode
#[utoipa::path(
    get,
    path = "/barcode/{barcode}",
    tag = "Inventory",
    params(("barcode" = String, Path, description = "EAN/UPC barcode")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
async fn get_by_barcode<R: ProductRepository>(
    State(service): SharedService<R>,
    axum::extract::Path(barcode): axum::extract::Path<String>,
) -> InventoryResult<Json<Product>> {
    let product = service.get_by_barcode(&barcode).await?;
    Ok(Json(product))
}

/// In-stock products at or under the threshold
#[utoipa::path(
    get,
    path = "/low-stock",
    tag = "Inventory",
    params(ThresholdQuery),
    responses((status = 200, description = "Low stock products", body = Vec<Product>))
)]
async fn low_stock<R: ProductRepository>(
    State(service): SharedService<R>,
    Query(query): Query<ThresholdQuery>,
) -> InventoryResult<Json<Vec<Product>>> {
    let products = service.low_stock(query.threshold).await?;
    Ok(Json(products))
}

/// Products with nothing on hand
#[utoipa::path(
    get,
    path = "/out-of-stock",
    tag = "Inventory",
    responses((status = 200, description = "Out of stock products", body = Vec<Product>))
)]
async fn out_of_stock<R: ProductRepository>(
    State(service): SharedService<R>,
) -> InventoryResult<Json<Vec<Product>>> {
    let products = service.out_of_stock().await?;
    Ok(Json(products))
}

/// Products grouped by category, status, supplier or location
#[utoipa::path(
    get,
    path = "/groups/{key}",
    tag = "Inventory",
    params(("key" = GroupKey, Path, description = "Grouping key")),
    responses(
        (status = 200, description = "Groups in order of first appearance", body = Vec<ProductGroup>),
        (status = 400, description = "Unknown key", body = ErrorResponse)
    )
)]
async fn group_products<R: ProductRepository>(
    State(service): SharedService<R>,
    ParsedPath(key): ParsedPath<GroupKey>,
) -> InventoryResult<Json<Vec<ProductGroup>>> {
    let groups = service.group_products(key).await?;
    Ok(Json(groups))
}

/// Distinct values of a key, for filter dropdowns
#[utoipa::path(
    get,
    path = "/options/{key}",
    tag = "Inventory",
    params(("key" = GroupKey, Path, description = "Field to list values of")),
    responses(
        (status = 200, description = "Sorted distinct values", body = Vec<String>),
        (status = 400, description = "Unknown key", body = ErrorResponse)
    )
)]
async fn filter_options<R: ProductRepository>(
    State(service): SharedService<R>,
    ParsedPath(key): ParsedPath<GroupKey>,
) -> InventoryResult<Json<Vec<String>>> {
    let values = service.filter_options(key).await?;
    Ok(Json(values))
}

/// Export the products matching the list filters
#[utoipa::path(
    get,
    path = "/export/{format}",
    tag = "Inventory",
    params(
        ("format" = ExportFormat, Path, description = "csv, json or html"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Rendered CSV, JSON or HTML document", body = String, content_type = "text/plain"),
        (status = 400, description = "Unsupported format", body = ErrorResponse)
    )
)]
async fn export_products<R: ProductRepository>(
    State(service): SharedService<R>,
    ParsedPath(format): ParsedPath<ExportFormat>,
    Query(query): Query<ListQuery>,
) -> InventoryResult<impl IntoResponse> {
    let criteria = ListRequest::from(query).criteria;
    let body = service.export(format, criteria).await?;
    let disposition = format!(
        "attachment; filename=\"inventario.{}\"",
        format.file_extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Headline inventory numbers
#[utoipa::path(
    get,
    path = "/analytics/summary",
    tag = "Analytics",
    responses((status = 200, description = "Inventory summary", body = InventorySummary))
)]
async fn summary<R: ProductRepository>(
    State(service): SharedService<R>,
) -> InventoryResult<Json<InventorySummary>> {
    let summary = service.summary().await?;
    Ok(Json(summary))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DistributionQuery {
    /// Shares by inventory value instead of product count
    #[serde(default)]
    pub by_value: bool,
}

/// Share of products per category, status, supplier or location
#[utoipa::path(
    get,
    path = "/analytics/distribution/{key}",
    tag = "Analytics",
    params(
        ("key" = GroupKey, Path, description = "Bucket key"),
        DistributionQuery
    ),
    responses(
        (status = 200, description = "Distribution buckets", body = Vec<DistributionEntry>),
        (status = 400, description = "Unknown key", body = ErrorResponse)
    )
)]
async fn distribution<R: ProductRepository>(
    State(service): SharedService<R>,
    ParsedPath(key): ParsedPath<GroupKey>,
    Query(query): Query<DistributionQuery>,
) -> InventoryResult<Json<Vec<DistributionEntry>>> {
    let entries = service.distribution(key, query.by_value).await?;
    Ok(Json(entries))
}

/// ABC classification by inventory value
#[utoipa::path(
    get,
    path = "/analytics/abc",
    tag = "Analytics",
    responses((status = 200, description = "ABC analysis", body = AbcAnalysis))
)]
async fn abc_analysis<R: ProductRepository>(
    State(service): SharedService<R>,
) -> InventoryResult<Json<AbcAnalysis>> {
    let analysis = service.abc_analysis().await?;
    Ok(Json(analysis))
}

/// ABC classification as a CSV download
#[utoipa::path(
    get,
    path = "/analytics/abc/export",
    tag = "Analytics",
    responses((status = 200, description = "ABC table", body = String, content_type = "text/csv"))
)]
async fn abc_export<R: ProductRepository>(
    State(service): SharedService<R>,
) -> InventoryResult<impl IntoResponse> {
    let body = service.export_abc().await?;
    Ok((
        [
            (header::CONTENT_TYPE, ExportFormat::Csv.content_type()),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"analisis-abc.csv\""),
        ],
        body,
    ))
}

/// Restock proposals
#[utoipa::path(
    get,
    path = "/analytics/reorder",
    tag = "Analytics",
    responses((status = 200, description = "Reorder suggestions", body = Vec<ReorderSuggestion>))
)]
async fn reorder_suggestions<R: ProductRepository>(
    State(service): SharedService<R>,
) -> InventoryResult<Json<Vec<ReorderSuggestion>>> {
    let suggestions = service.reorder_suggestions().await?;
    Ok(Json(suggestions))
}

/// Recent notifications, newest last
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Inventory",
    responses((status = 200, description = "Notification history", body = Vec<Notification>))
)]
async fn notifications<R: ProductRepository>(
    State(service): SharedService<R>,
) -> Json<Vec<Notification>> {
    Json(service.notifications().recent())
}
