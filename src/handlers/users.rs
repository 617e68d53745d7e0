use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::{
    entities::employee_profile::Role,
    errors::ServiceError,
    services::accounts::{landing_path, CreateUserInput},
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Role,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Login payload: the token plus the role-appropriate landing route.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub username: String,
    pub role: Role,
    pub landing: &'static str,
}

/// POST /users — creates the account and its employee profile atomically.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let (account, profile) = state
        .accounts
        .create_user(CreateUserInput {
            username: request.username,
            password: request.password,
            email: request.email,
            role: request.role,
            phone_number: request.phone_number,
            is_superuser: request.is_superuser,
        })
        .await?;

    Ok(created_response(serde_json::json!({
        "user": account,
        "profile": profile,
    })))
}

/// GET /users — all accounts with their profiles.
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let users = state.accounts.list_users().await?;
    Ok(success_response(users))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&request)?;

    let (account, profile) = state
        .accounts
        .authenticate(&request.username, &request.password)
        .await?;

    let token = state.auth.issue_token(
        account.id,
        &account.username,
        profile.role,
        account.is_superuser,
    )?;

    info!(username = %account.username, role = %profile.role, "User logged in");

    Ok(success_response(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        username: account.username,
        role: profile.role,
        landing: landing_path(profile.role),
    }))
}

/// GET /auth/login — the redirect target for rejected requests.
async fn login_entry() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(
            "Authentication required. POST credentials to /auth/login.".to_string(),
        )),
    )
        .into_response()
}

/// Routes mounted at /auth.
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login).get(login_entry))
}
