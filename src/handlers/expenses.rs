use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::CurrentUser,
    errors::ServiceError,
    services::expenses::{CreateExpenseInput, ExpenseListFilter},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub category_id: i32,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    pub category: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// POST /expense-categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseCategoryRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;
    let created = state
        .expenses
        .create_category(request.name, request.description)
        .await?;
    Ok(created_response(created))
}

/// GET /expense-categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let categories = state.expenses.list_categories().await?;
    Ok(success_response(categories))
}

/// DELETE /expense-categories/:id — rejected while expenses reference it.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    state.expenses.delete_category(id).await?;
    Ok(no_content_response())
}

/// POST /expenses
pub async fn create_expense(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<Response, ServiceError> {
    let created = state
        .expenses
        .create_expense(
            user.user_id,
            CreateExpenseInput {
                category_id: request.category_id,
                amount: request.amount,
                date: request.date,
                description: request.description,
            },
        )
        .await?;
    Ok(created_response(created))
}

/// GET /expenses — filtered listing; bad date filters come back as warnings.
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Response, ServiceError> {
    let listing = state
        .expenses
        .list_expenses(ExpenseListFilter {
            category: query.category,
            start_date: query.start_date,
            end_date: query.end_date,
        })
        .await?;
    Ok(success_response(listing))
}
