use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{errors::ServiceError, services::customers::CustomerInput, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl From<CustomerRequest> for CustomerInput {
    fn from(request: CustomerRequest) -> Self {
        CustomerInput {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone_number: request.phone_number,
            address: request.address,
            notes: request.notes,
        }
    }
}

/// GET /customers
pub async fn list_customers(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let customers = state.customers.list_customers().await?;
    Ok(success_response(customers))
}

/// POST /customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CustomerRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let created = state.customers.create_customer(request.into()).await?;
    Ok(created_response(created))
}

/// GET /customers/:id — contact record plus purchase history.
pub async fn customer_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let detail = state.customers.get_customer_detail(id).await?;
    Ok(success_response(detail))
}

/// PUT /customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CustomerRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let updated = state.customers.update_customer(id, request.into()).await?;
    Ok(success_response(updated))
}
