use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    errors::ServiceError,
    services::catalog::{CreateProductInput, UpdateProductInput},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<i32>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    #[validate(length(max = 100))]
    pub barcode: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub reorder_level: Option<i32>,
    #[validate(length(max = 100))]
    pub barcode: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

/// GET /products — the public storefront listing: active products plus the
/// category index.
pub async fn list_products(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let products = state.catalog.list_active_products().await?;
    let categories = state.catalog.list_categories().await?;

    Ok(success_response(serde_json::json!({
        "products": products,
        "categories": categories,
    })))
}

/// GET /products — every product, active or not, for management.
pub async fn list_all_products(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let products = state.catalog.list_all_products().await?;
    Ok(success_response(products))
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let created = state
        .catalog
        .create_product(CreateProductInput {
            name: request.name,
            description: request.description,
            price: request.price,
            category_id: request.category_id,
            stock_quantity: request.stock_quantity,
            reorder_level: request.reorder_level,
            barcode: request.barcode,
        })
        .await?;

    Ok(created_response(created))
}

/// GET /products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let prod = state.catalog.get_product(id).await?;
    Ok(success_response(prod))
}

/// PUT /products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let updated = state
        .catalog
        .update_product(
            id,
            UpdateProductInput {
                name: request.name,
                description: request.description,
                price: request.price,
                category_id: request.category_id,
                reorder_level: request.reorder_level,
                barcode: request.barcode,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(success_response(updated))
}

/// DELETE /products/:id — soft delete; the record stays for history.
pub async fn deactivate_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let updated = state.catalog.deactivate_product(id).await?;
    Ok(success_response(updated))
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let categories = state.catalog.list_categories().await?;
    Ok(success_response(categories))
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let created = state
        .catalog
        .create_category(request.name, request.description)
        .await?;
    Ok(created_response(created))
}
