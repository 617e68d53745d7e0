use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{created_response, success_response, success_with_message, validate_input};
use crate::{
    auth::CurrentUser,
    errors::ServiceError,
    services::purchasing::{CreatePurchaseOrderInput, PurchaseOrderLineInput, ReceiveOutcome},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    pub supplier_id: i32,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A purchase order must contain at least one item"))]
    pub items: Vec<PurchaseOrderLineRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PurchaseOrderLineRequest {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

/// GET /purchase-orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let orders = state.purchasing.list_purchase_orders().await?;
    Ok(success_response(orders))
}

/// POST /purchase-orders
pub async fn create_purchase_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreatePurchaseOrderRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let items = request
        .items
        .into_iter()
        .map(|line| PurchaseOrderLineInput {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_cost: line.unit_cost,
        })
        .collect();

    let detail = state
        .purchasing
        .create_purchase_order(
            user.user_id,
            CreatePurchaseOrderInput {
                supplier_id: request.supplier_id,
                expected_delivery_date: request.expected_delivery_date,
                notes: request.notes,
                items,
            },
        )
        .await?;

    Ok(created_response(detail))
}

/// GET /purchase-orders/:id
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let detail = state.purchasing.get_purchase_order(id).await?;
    Ok(success_response(detail))
}

/// POST /purchase-orders/:id/receive — idempotent stock-increment
/// transition.
pub async fn receive_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let outcome = state.purchasing.receive_purchase_order(id).await?;

    let response = match &outcome {
        ReceiveOutcome::Received { purchase_order } => success_with_message(
            &outcome,
            format!(
                "Purchase Order #{} successfully received and stock updated!",
                purchase_order.id
            ),
        ),
        ReceiveOutcome::AlreadyReceived { purchase_order } => success_with_message(
            &outcome,
            format!(
                "Purchase Order #{} has already been received.",
                purchase_order.id
            ),
        ),
    };
    Ok(response)
}

/// POST /purchase-orders/:id/mark-ordered
pub async fn mark_ordered(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let updated = state.purchasing.mark_ordered(id).await?;
    Ok(success_response(updated))
}

/// POST /purchase-orders/:id/cancel
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let updated = state.purchasing.cancel_purchase_order(id).await?;
    Ok(success_response(updated))
}
