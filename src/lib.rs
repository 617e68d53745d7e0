//! Shopfront API
//!
//! Point-of-sale and inventory backend for small retail businesses: product
//! catalog, stock tracking, sales, purchasing, customers, employee accounts,
//! expenses and reporting over a relational store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};

use auth::{AuthService, RoleGate, RoleRouterExt};
use db::DbPool;
use errors::ServiceError;
use events::EventSender;

/// Shared application state: the pool, configuration, event handle and one
/// instance of each service.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: EventSender,
    pub auth: Arc<AuthService>,
    pub catalog: services::catalog::CatalogService,
    pub sales: services::sales::SalesService,
    pub purchasing: services::purchasing::PurchasingService,
    pub stock: services::stock::StockService,
    pub customers: services::customers::CustomerService,
    pub accounts: services::accounts::AccountService,
    pub expenses: services::expenses::ExpenseService,
    pub reports: services::reports::ReportService,
    pub notifications: services::notifications::NotificationService,
}

impl AppState {
    /// Wires every service against the shared pool and event channel.
    pub fn build(
        db: Arc<DbPool>,
        config: config::AppConfig,
        event_sender: EventSender,
    ) -> Result<Self, ServiceError> {
        let auth = Arc::new(AuthService::new(
            config.jwt_secret.clone(),
            config.jwt_expiration,
        ));
        let notifications = services::notifications::NotificationService::from_config(
            db.clone(),
            &config.mail,
            event_sender.clone(),
        )?;

        Ok(Self {
            catalog: services::catalog::CatalogService::new(db.clone()),
            sales: services::sales::SalesService::new(db.clone(), event_sender.clone()),
            purchasing: services::purchasing::PurchasingService::new(
                db.clone(),
                event_sender.clone(),
            ),
            stock: services::stock::StockService::new(db.clone(), event_sender.clone()),
            customers: services::customers::CustomerService::new(db.clone()),
            accounts: services::accounts::AccountService::new(db.clone(), event_sender.clone()),
            expenses: services::expenses::ExpenseService::new(db.clone()),
            reports: services::reports::ReportService::new(db.clone()),
            notifications,
            auth,
            db,
            config,
            event_sender,
        })
    }
}

/// Common response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Versioned API routes with per-area role gating.
///
/// Gate map, kept from the original system: POS and customers are
/// cashier-level, stock and purchasing are stock-manager-level, reporting,
/// expenses and user management are owner-only. The storefront listing is
/// public.
pub fn api_v1_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .route("/storefront", get(handlers::products::list_products));

    let pos = Router::new()
        .route("/pos/catalog", get(handlers::pos::register_catalog))
        .route("/pos/sales", post(handlers::pos::record_sale))
        .route("/pos/sales/mine", get(handlers::pos::my_sales))
        .route("/pos/sales/:id", get(handlers::pos::receipt))
        .route("/pos/barcode", get(handlers::pos::product_by_barcode))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(handlers::customers::customer_detail).put(handlers::customers::update_customer),
        )
        .with_role_gate(RoleGate::Cashier);

    let stock = Router::new()
        .route(
            "/products",
            get(handlers::products::list_all_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::deactivate_product),
        )
        .route(
            "/categories",
            get(handlers::products::list_categories).post(handlers::products::create_category),
        )
        .route(
            "/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/suppliers/:id",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        .route(
            "/purchase-orders",
            get(handlers::purchase_orders::list_purchase_orders)
                .post(handlers::purchase_orders::create_purchase_order),
        )
        .route(
            "/purchase-orders/:id",
            get(handlers::purchase_orders::get_purchase_order),
        )
        .route(
            "/purchase-orders/:id/receive",
            post(handlers::purchase_orders::receive_purchase_order),
        )
        .route(
            "/purchase-orders/:id/mark-ordered",
            post(handlers::purchase_orders::mark_ordered),
        )
        .route(
            "/purchase-orders/:id/cancel",
            post(handlers::purchase_orders::cancel_purchase_order),
        )
        .route(
            "/stock-adjustments",
            get(handlers::stock_adjustments::list_adjustments)
                .post(handlers::stock_adjustments::create_adjustment),
        )
        .route("/reports/low-stock", get(handlers::reports::low_stock_report))
        .with_role_gate(RoleGate::StockManager);

    let owner = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/sales", get(handlers::pos::list_sales))
        .route(
            "/sales/:sale_id/items/:item_id",
            delete(handlers::pos::remove_sale_item),
        )
        .route(
            "/expense-categories",
            get(handlers::expenses::list_categories).post(handlers::expenses::create_category),
        )
        .route(
            "/expense-categories/:id",
            delete(handlers::expenses::delete_category),
        )
        .route(
            "/expenses",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route("/reports/sales", get(handlers::reports::sales_summary))
        .route(
            "/reports/sales/export/:period",
            get(handlers::reports::export_sales_csv),
        )
        .route(
            "/reports/products",
            get(handlers::reports::product_performance),
        )
        .route("/reports/expenses", get(handlers::reports::expense_report))
        .with_role_gate(RoleGate::Owner);

    public.merge(pos).merge(stock).merge(owner)
}

/// Builds the full application router: API, auth entry point, request
/// logging, and the extension layer the role gates read the auth service
/// from. The binary adds CORS and compression on top.
pub fn build_app(state: AppState) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .route("/", get(|| async { "shopfront-api up" }))
        .nest("/api/v1", api_v1_routes())
        .nest("/auth", handlers::users::auth_routes())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        .with_state(state)
}

async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(auth);
    next.run(req).await
}

async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "shopfront-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}
