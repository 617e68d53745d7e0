use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
};
use serde::Deserialize;

use super::common::success_response;
use crate::{errors::ServiceError, AppState};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Restrict the sales summary to one employee's sales.
    pub employee: Option<i32>,
}

/// GET /reports/sales — revenue, count, average and the daily chart series.
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let report = state
        .reports
        .sales_summary(
            query.period.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.employee,
        )
        .await?;
    Ok(success_response(report))
}

/// GET /reports/products — quantity-sold and revenue rankings.
pub async fn product_performance(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let report = state.reports.product_performance().await?;
    Ok(success_response(report))
}

/// GET /reports/expenses — totals, category breakdown, monthly series.
pub async fn expense_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ServiceError> {
    let report = state
        .reports
        .expense_report(
            query.period.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(success_response(report))
}

/// GET /reports/sales/export/:period — CSV attachment, one row per sale
/// line item.
pub async fn export_sales_csv(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Response, ServiceError> {
    let export = state.reports.export_sales_csv(&period).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        )
        .body(Body::from(export.body))
        .map_err(|e| ServiceError::InternalError(format!("Failed to build CSV response: {}", e)))
}

/// GET /reports/low-stock — low-stock products; viewing it triggers the
/// email alert. A delivery failure is reported in the payload, never as a
/// failed page.
pub async fn low_stock_report(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let products = state.catalog.low_stock_products().await?;

    let email_status = match state.notifications.send_low_stock_alert(&products).await {
        Ok(status) => status,
        Err(err) => format!("Failed to send low stock alert email: {}", err),
    };

    Ok(success_response(serde_json::json!({
        "low_stock_products": products,
        "email_status": email_status,
    })))
}
