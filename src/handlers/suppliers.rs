use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{errors::ServiceError, services::purchasing::SupplierInput, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 100))]
    pub contact_person: Option<String>,
    pub phone_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl From<SupplierRequest> for SupplierInput {
    fn from(request: SupplierRequest) -> Self {
        SupplierInput {
            name: request.name,
            contact_person: request.contact_person,
            phone_number: request.phone_number,
            email: request.email,
            address: request.address,
            notes: request.notes,
        }
    }
}

/// GET /suppliers
pub async fn list_suppliers(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let suppliers = state.purchasing.list_suppliers().await?;
    Ok(success_response(suppliers))
}

/// POST /suppliers
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(request): Json<SupplierRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let created = state.purchasing.create_supplier(request.into()).await?;
    Ok(created_response(created))
}

/// GET /suppliers/:id
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let supplier = state.purchasing.get_supplier(id).await?;
    Ok(success_response(supplier))
}

/// PUT /suppliers/:id
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<SupplierRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let updated = state
        .purchasing
        .update_supplier(id, request.into())
        .await?;
    Ok(success_response(updated))
}

/// DELETE /suppliers/:id — rejected while purchase orders reference it.
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.purchasing.delete_supplier(id).await?;
    Ok(no_content_response())
}
