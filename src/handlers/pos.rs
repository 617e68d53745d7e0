use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{auth::CurrentUser, errors::ServiceError, services::sales::SaleLineInput, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RecordSaleRequest {
    pub customer_id: Option<i32>,
    #[validate(length(min = 1, message = "A sale must contain at least one item"))]
    pub items: Vec<SaleLineRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SaleLineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct BarcodeQuery {
    pub barcode: Option<String>,
}

/// Barcode lookup payload, shaped for the register UI.
#[derive(Debug, Serialize)]
pub struct BarcodeProduct {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
}

/// POST /pos/sales — records a sale atomically.
pub async fn record_sale(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<RecordSaleRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let lines = request
        .items
        .into_iter()
        .map(|item| SaleLineInput {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let receipt = state
        .sales
        .record_sale(user.user_id, request.customer_id, lines)
        .await?;

    info!(
        sale_id = receipt.sale.id,
        cashier = %user.username,
        "Sale recorded via POS"
    );

    Ok(created_response(receipt))
}

/// GET /pos/catalog — sellable products and the customer picker.
pub async fn register_catalog(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let products = state.catalog.list_sellable_products().await?;
    let customers = state.customers.list_customers().await?;

    Ok(success_response(serde_json::json!({
        "products": products,
        "customers": customers,
    })))
}

/// GET /pos/barcode?barcode=… — active, in-stock product lookup.
pub async fn product_by_barcode(
    State(state): State<AppState>,
    Query(query): Query<BarcodeQuery>,
) -> Result<Response, ServiceError> {
    let barcode = query
        .barcode
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ServiceError::ValidationError("Barcode not provided.".to_string()))?;

    let prod = state.catalog.find_by_barcode(&barcode).await?;

    Ok(success_response(BarcodeProduct {
        id: prod.id,
        name: prod.name,
        price: prod.price,
        stock_quantity: prod.stock_quantity,
        barcode: prod.barcode,
    }))
}

/// GET /pos/sales/mine — the calling cashier's sales, newest first.
pub async fn my_sales(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, ServiceError> {
    let sales = state.sales.list_sales_for_user(user.user_id).await?;
    Ok(success_response(sales))
}

/// GET /pos/sales/:id — receipt payload for one sale.
pub async fn receipt(
    State(state): State<AppState>,
    Path(sale_id): Path<i32>,
) -> Result<Response, ServiceError> {
    let receipt = state.sales.get_receipt(sale_id).await?;
    Ok(success_response(receipt))
}

#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub customer_id: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Serialize)]
pub struct SaleListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// GET /sales — paginated sales listing.
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Response, ServiceError> {
    let (items, total) = state
        .sales
        .list_sales(query.customer_id, query.limit, query.offset)
        .await?;
    Ok(success_response(SaleListResponse { items, total }))
}

/// DELETE /sales/:sale_id/items/:item_id — removes a line, restoring stock.
pub async fn remove_sale_item(
    State(state): State<AppState>,
    Path((sale_id, item_id)): Path<(i32, i32)>,
) -> Result<Response, ServiceError> {
    let updated = state.sales.remove_sale_item(sale_id, item_id).await?;
    Ok(success_response(updated))
}
