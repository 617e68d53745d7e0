mod common;

use axum::http::{header, Method, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::json;
use std::str::FromStr;

use common::{read_json, read_text, TestApp};
use shopfront_api::entities::{employee_profile::Role, sale};

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).expect("parse decimal")
}

async fn record_sale(app: &TestApp, token: &str, product_id: i32, quantity: i32) {
    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(token),
            Some(json!({ "items": [{ "product_id": product_id, "quantity": quantity }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn sales_summary_aggregates_revenue_count_and_average() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Soap", dec!(1000), 50, None).await;

    record_sale(&app, &app.owner_token, prod.id, 3).await;
    record_sale(&app, &app.owner_token, prod.id, 1).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/sales?period=today",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let report = &body["data"];
    assert_eq!(report["transaction_count"].as_u64().unwrap(), 2);
    assert_eq!(decimal(&report["total_revenue"]), dec!(4000));
    assert_eq!(decimal(&report["average_sale_value"]), dec!(2000));
    assert_eq!(report["daily_sales"].as_array().unwrap().len(), 1);
    assert_eq!(report["chart_labels"].as_array().unwrap().len(), 1);
    assert_eq!(report["chart_data"][0].as_f64().unwrap(), 4000.0);
}

#[tokio::test]
async fn sales_summary_can_filter_by_employee() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Soap", dec!(1000), 50, None).await;
    let (cashier_id, cashier_token) = app.user_with_role(Role::Cashier).await;

    record_sale(&app, &app.owner_token, prod.id, 2).await;
    record_sale(&app, &cashier_token, prod.id, 5).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/reports/sales?period=today&employee={}", cashier_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["transaction_count"].as_u64().unwrap(), 1);
    assert_eq!(decimal(&body["data"]["total_revenue"]), dec!(5000));
}

#[tokio::test]
async fn custom_period_with_bad_dates_warns_and_falls_back() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/sales?period=custom&start_date=garbage&end_date=2030-01-15",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let warnings = body["data"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("Invalid start date"));
    assert_eq!(body["data"]["end_date"].as_str().unwrap(), "2030-01-15");
}

#[tokio::test]
async fn csv_export_has_one_row_per_line_item_and_placeholders() {
    let app = TestApp::new().await;
    let soap = app.seed_product("Soap", dec!(1000), 50, None).await;
    let rice = app.seed_product("Rice", dec!(500), 50, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({
                "items": [
                    { "product_id": soap.id, "quantity": 2 },
                    { "product_id": rice.id, "quantity": 4 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A header-only sale, as deleting every line leaves behind.
    sale::ActiveModel {
        user_id: Set(Some(app.owner_id)),
        customer_id: Set(None),
        total_amount: Set(Decimal::ZERO),
        sale_date: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&*app.state.db)
    .await
    .expect("insert empty sale");

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/sales/export/all",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("text/csv")
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("attachment; filename=\"sales_report_all_"));

    let csv_body = read_text(response).await;
    let lines: Vec<&str> = csv_body.trim().lines().collect();
    // Header + two item rows + one placeholder row.
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Sale ID,Sale Date,Total Amount,Processed By,Customer"));
    assert!(csv_body.contains("Soap,2,1000.00,2000.00"));
    assert!(csv_body.contains("Rice,4,500.00,2000.00"));
    assert!(csv_body.contains("(no items),0,,"));
    assert!(csv_body.contains("owner"));
}

#[tokio::test]
async fn expense_report_breaks_down_by_category_and_month() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/expense-categories",
            Some(&app.owner_token),
            Some(json!({ "name": "Rent" })),
        )
        .await;
    let rent_id = read_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/expense-categories",
            Some(&app.owner_token),
            Some(json!({ "name": "Utilities" })),
        )
        .await;
    let utilities_id = read_json(response).await["data"]["id"].as_i64().unwrap();

    for (category_id, amount) in [(rent_id, "90000"), (utilities_id, "12000")] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/expenses",
                Some(&app.owner_token),
                Some(json!({ "category_id": category_id, "amount": amount })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/expenses?period=this_month",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let report = &body["data"];
    assert_eq!(decimal(&report["total_expenses"]), dec!(102000));

    let by_category = report["by_category"].as_array().unwrap();
    assert_eq!(by_category.len(), 2);
    // Largest category first.
    assert_eq!(by_category[0]["category_name"].as_str().unwrap(), "Rent");
    assert_eq!(decimal(&by_category[0]["total_amount"]), dec!(90000));

    assert_eq!(report["monthly"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn referenced_expense_categories_cannot_be_deleted() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/expense-categories",
            Some(&app.owner_token),
            Some(json!({ "name": "Rent" })),
        )
        .await;
    let category_id = read_json(response).await["data"]["id"].as_i64().unwrap();

    app.request(
        Method::POST,
        "/api/v1/expenses",
        Some(&app.owner_token),
        Some(json!({ "category_id": category_id, "amount": "5000" })),
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/expense-categories/{}", category_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn expense_listing_reports_bad_date_filters_as_warnings() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/expenses?start_date=13-2024-99",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let warnings = body["data"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("Invalid start date"));
}

#[tokio::test]
async fn low_stock_report_lists_products_and_reports_email_status() {
    let app = TestApp::new().await;
    // reorder_level defaults to 10, so stock 2 is low; stock 50 is not.
    app.seed_product("Soap", dec!(1000), 2, None).await;
    app.seed_product("Rice", dec!(500), 50, None).await;

    let (_, stock_token) = app.user_with_role(Role::StockManager).await;
    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/low-stock",
            Some(&stock_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let products = body["data"]["low_stock_products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"].as_str().unwrap(), "Soap");

    // No SMTP configured and no recipients with email addresses; the page
    // still renders and explains why nothing was sent.
    let status = body["data"]["email_status"].as_str().unwrap();
    assert!(!status.is_empty());
}

#[tokio::test]
async fn product_performance_ranks_by_quantity_and_revenue() {
    let app = TestApp::new().await;
    let soap = app.seed_product("Soap", dec!(1000), 50, None).await;
    let rice = app.seed_product("Rice", dec!(200), 50, None).await;
    app.seed_product("Unsold", dec!(999), 50, None).await;

    record_sale(&app, &app.owner_token, soap.id, 2).await; // revenue 2000
    record_sale(&app, &app.owner_token, rice.id, 5).await; // revenue 1000

    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/products",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let by_quantity = body["data"]["by_quantity"].as_array().unwrap();
    let by_revenue = body["data"]["by_revenue"].as_array().unwrap();

    // Unsold products are omitted entirely.
    assert_eq!(by_quantity.len(), 2);
    assert_eq!(by_quantity[0]["name"].as_str().unwrap(), "Rice");
    assert_eq!(by_revenue[0]["name"].as_str().unwrap(), "Soap");
    assert_eq!(decimal(&by_revenue[0]["total_revenue"]), dec!(2000));
}
