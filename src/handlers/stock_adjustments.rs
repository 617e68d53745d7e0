use axum::{extract::State, response::Response, Json};
use serde::Deserialize;

use super::common::{created_response, success_response};
use crate::{
    auth::CurrentUser,
    entities::stock_adjustment::AdjustmentType,
    errors::ServiceError,
    services::stock::StockAdjustmentInput,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct StockAdjustmentRequest {
    pub product_id: i32,
    pub quantity_change: i32,
    #[serde(default = "default_adjustment_type")]
    pub adjustment_type: AdjustmentType,
    pub notes: Option<String>,
}

fn default_adjustment_type() -> AdjustmentType {
    AdjustmentType::Other
}

/// POST /stock-adjustments — records the ledger entry and applies the delta.
pub async fn create_adjustment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<StockAdjustmentRequest>,
) -> Result<Response, ServiceError> {
    let applied = state
        .stock
        .create_adjustment(
            user.user_id,
            StockAdjustmentInput {
                product_id: request.product_id,
                quantity_change: request.quantity_change,
                adjustment_type: request.adjustment_type,
                notes: request.notes,
            },
        )
        .await?;

    Ok(created_response(applied))
}

/// GET /stock-adjustments — the ledger, newest first.
pub async fn list_adjustments(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let adjustments = state.stock.list_adjustments().await?;
    Ok(success_response(adjustments))
}
