//! Authentication and authorization.
//!
//! Access tokens are short-lived JWTs carrying the user's id, username,
//! role and superuser flag. Role gates are typed (see [`roles`]); a request
//! that fails a gate is redirected to the login entry point rather than
//! receiving a distinct forbidden response, matching the behavior of the
//! system this replaces.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::employee_profile::Role;
use crate::errors::ServiceError;

pub mod roles;

pub use roles::RoleGate;

/// Where unauthenticated and under-privileged requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Claim structure for JWT access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub superuser: bool,
    /// JWT id
    pub jti: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
}

/// Authenticated caller, extracted from a verified token. Inserted into
/// request extensions by the role-gate middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServiceError::AuthError("Missing authenticated user".to_string()))
    }
}

/// Issued token pair returned by login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
}

/// JWT issue/verify service. Stateless; password checks live in the
/// accounts service.
pub struct AuthService {
    jwt_secret: String,
    jwt_expiration: usize,
}

impl AuthService {
    pub fn new(jwt_secret: String, jwt_expiration: usize) -> Self {
        Self {
            jwt_secret,
            jwt_expiration,
        }
    }

    pub fn issue_token(
        &self,
        user_id: i32,
        username: &str,
        role: Role,
        is_superuser: bool,
    ) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            superuser: is_superuser,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.jwt_expiration as i64,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("Failed to issue token: {}", e)))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_expiration,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<CurrentUser, ServiceError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| ServiceError::AuthError(format!("Invalid token: {}", e)))?;

        let user_id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| ServiceError::AuthError("Invalid token subject".to_string()))?;

        Ok(CurrentUser {
            user_id,
            username: data.claims.username,
            role: data.claims.role,
            is_superuser: data.claims.superuser,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Role-gate middleware. Verifies the bearer token, checks the gate and
/// stashes the caller in request extensions for handlers.
///
/// Both the unauthenticated and the wrong-role case redirect to the login
/// entry point (303); the original system made the same simplification.
pub async fn role_gate_middleware(
    State(gate): State<RoleGate>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth) = req.extensions().get::<Arc<AuthService>>().cloned() else {
        tracing::error!("AuthService missing from request extensions");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let user = match bearer_token(req.headers()).and_then(|t| auth.verify_token(t).ok()) {
        Some(user) => user,
        None => return Redirect::to(LOGIN_PATH).into_response(),
    };

    if !gate.allows(user.role, user.is_superuser) {
        tracing::debug!(
            username = %user.username,
            role = %user.role,
            required = ?gate,
            "Role gate rejected request"
        );
        return Redirect::to(LOGIN_PATH).into_response();
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Extension methods for gating routers by role.
pub trait RoleRouterExt {
    fn with_role_gate(self, gate: RoleGate) -> Self;
}

impl<S> RoleRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_role_gate(self, gate: RoleGate) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            gate,
            role_gate_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("unit-test-secret-key-with-enough-length".to_string(), 3600)
    }

    #[test]
    fn issued_token_round_trips() {
        let auth = service();
        let token = auth
            .issue_token(42, "alice", Role::Cashier, false)
            .expect("issue");
        let user = auth.verify_token(&token.access_token).expect("verify");
        assert_eq!(user.user_id, 42);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Cashier);
        assert!(!user.is_superuser);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = service();
        assert!(auth.verify_token("not-a-token").is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = AuthService::new("a-completely-different-secret-keyyyyy".to_string(), 3600);
        let token = other
            .issue_token(1, "bob", Role::Owner, false)
            .expect("issue");
        assert!(service().verify_token(&token.access_token).is_err());
    }
}
