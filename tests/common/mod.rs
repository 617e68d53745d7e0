use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use shopfront_api::{
    build_app,
    config::AppConfig,
    db,
    entities::{employee_profile::Role, product},
    events::{self, EventSender},
    services::accounts::CreateUserInput,
    services::catalog::CreateProductInput,
    AppState,
};

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Test harness: the application over a fresh in-memory SQLite database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub owner_token: String,
    pub owner_id: i32,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Builds the app against `sqlite::memory:` with a single pooled
    /// connection so every query sees the same database, runs migrations
    /// and seeds one owner account.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::build(Arc::new(pool), cfg, event_sender)
            .expect("failed to build app state");
        let router = build_app(state.clone());

        let (owner, profile) = state
            .accounts
            .create_user(CreateUserInput {
                username: "owner".to_string(),
                password: "ownerpass123".to_string(),
                email: None,
                role: Role::Owner,
                phone_number: None,
                is_superuser: false,
            })
            .await
            .expect("failed to seed owner");

        let owner_token = state
            .auth
            .issue_token(owner.id, &owner.username, profile.role, owner.is_superuser)
            .expect("failed to issue owner token")
            .access_token;

        Self {
            router,
            state,
            owner_token,
            owner_id: owner.id,
            _event_task: event_task,
        }
    }

    /// Creates a user with the given role and returns (user id, token).
    pub async fn user_with_role(&self, role: Role) -> (i32, String) {
        let username = format!("user-{}", Uuid::new_v4());
        let (account, profile) = self
            .state
            .accounts
            .create_user(CreateUserInput {
                username,
                password: "password123".to_string(),
                email: None,
                role,
                phone_number: None,
                is_superuser: false,
            })
            .await
            .expect("failed to create user");

        let token = self
            .state
            .auth
            .issue_token(
                account.id,
                &account.username,
                profile.role,
                account.is_superuser,
            )
            .expect("failed to issue token")
            .access_token;

        (account.id, token)
    }

    /// Seeds a product through the catalog service.
    pub async fn seed_product(
        &self,
        name: &str,
        price: Decimal,
        stock_quantity: i32,
        barcode: Option<&str>,
    ) -> product::Model {
        self.state
            .catalog
            .create_product(CreateProductInput {
                name: name.to_string(),
                description: None,
                price,
                category_id: None,
                stock_quantity: Some(stock_quantity),
                reorder_level: None,
                barcode: barcode.map(str::to_string),
            })
            .await
            .expect("failed to seed product")
    }

    /// Sends a request through the router. `token` adds a bearer header,
    /// `json` a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        json: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match json {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }
}

/// Reads a response body as JSON.
pub async fn read_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Reads a response body as a string.
pub async fn read_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    String::from_utf8(bytes.to_vec()).expect("response body is not UTF-8")
}

/// Asserts the response is the login redirect the role gates produce.
pub fn assert_login_redirect(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );
}
