mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use std::str::FromStr;

use common::{assert_login_redirect, read_json, TestApp};
use shopfront_api::entities::{
    employee_profile::Role,
    product::Entity as ProductEntity,
    sale::Entity as SaleEntity,
    sale_item::{self, Entity as SaleItemEntity},
};

async fn stock_of(app: &TestApp, product_id: i32) -> i32 {
    ProductEntity::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .expect("query product")
        .expect("product exists")
        .stock_quantity
}

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).expect("parse decimal")
}

#[tokio::test]
async fn recording_a_sale_computes_totals_and_decrements_stock() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Soap", dec!(1000), 10, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({ "items": [{ "product_id": prod.id, "quantity": 3 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(decimal(&body["data"]["sale"]["total_amount"]), dec!(3000));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(stock_of(&app, prod.id).await, 7);

    // Selling more than remains fails and leaves stock untouched.
    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({ "items": [{ "product_id": prod.id, "quantity": 8 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("not enough stock for Soap"));
    assert_eq!(stock_of(&app, prod.id).await, 7);
}

#[tokio::test]
async fn failed_line_rolls_back_the_entire_sale() {
    let app = TestApp::new().await;
    let first = app.seed_product("Rice", dec!(500), 20, None).await;
    let second = app.seed_product("Beans", dec!(700), 5, None).await;

    // Second line asks for more than available; the first line's decrement
    // must be rolled back too.
    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({
                "items": [
                    { "product_id": first.id, "quantity": 2 },
                    { "product_id": second.id, "quantity": 6 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(stock_of(&app, first.id).await, 20);
    assert_eq!(stock_of(&app, second.id).await, 5);

    let sales = SaleEntity::find()
        .all(&*app.state.db)
        .await
        .expect("query sales");
    assert!(sales.is_empty(), "sale header must not survive the rollback");
}

#[tokio::test]
async fn non_positive_quantity_is_a_validation_error() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Sugar", dec!(300), 10, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({ "items": [{ "product_id": prod.id, "quantity": 0 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("quantity must be positive"));
    assert_eq!(stock_of(&app, prod.id).await, 10);
}

#[tokio::test]
async fn sale_with_unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({ "items": [{ "product_id": 9999, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sale_stamps_the_customer_last_purchase() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Milk", dec!(800), 4, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(&app.owner_token),
            Some(json!({ "first_name": "Alice", "last_name": "M" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let customer_id = read_json(response).await["data"]["id"].as_i64().unwrap() as i32;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({
                "customer_id": customer_id,
                "items": [{ "product_id": prod.id, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["customer_name"].as_str().unwrap(), "Alice M");

    let detail = read_json(
        app.request(
            Method::GET,
            &format!("/api/v1/customers/{}", customer_id),
            Some(&app.owner_token),
            None,
        )
        .await,
    )
    .await;
    assert!(!detail["data"]["customer"]["last_purchase"].is_null());
    assert_eq!(detail["data"]["sales"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn removing_a_sale_line_restores_stock_and_total() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Flour", dec!(1200), 10, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({ "items": [{ "product_id": prod.id, "quantity": 4 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let sale_id = read_json(response).await["data"]["sale"]["id"].as_i64().unwrap() as i32;
    assert_eq!(stock_of(&app, prod.id).await, 6);

    let item = SaleItemEntity::find()
        .filter(sale_item::Column::SaleId.eq(sale_id))
        .one(&*app.state.db)
        .await
        .expect("query sale item")
        .expect("sale item exists");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/sales/{}/items/{}", sale_id, item.id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(decimal(&body["data"]["total_amount"]), Decimal::ZERO);
    assert_eq!(stock_of(&app, prod.id).await, 10);
}

#[tokio::test]
async fn duplicate_product_lines_are_rejected() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Tea", dec!(250), 10, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/sales",
            Some(&app.owner_token),
            Some(json!({
                "items": [
                    { "product_id": prod.id, "quantity": 1 },
                    { "product_id": prod.id, "quantity": 2 }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stock_of(&app, prod.id).await, 10);
}

#[tokio::test]
async fn barcode_lookup_returns_active_in_stock_products() {
    let app = TestApp::new().await;
    app.seed_product("Cola", dec!(600), 12, Some("4800888123457"))
        .await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/pos/barcode?barcode=4800888123457",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["name"].as_str().unwrap(), "Cola");
    assert_eq!(body["data"]["stock_quantity"].as_i64().unwrap(), 12);
    assert_eq!(decimal(&body["data"]["price"]), dec!(600));

    // Unknown barcode is a structured not-found.
    let response = app
        .request(
            Method::GET,
            "/api/v1/pos/barcode?barcode=0000000000000",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Missing parameter is a validation error.
    let response = app
        .request(
            Method::GET,
            "/api/v1/pos/barcode",
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_gates_redirect_to_login() {
    let app = TestApp::new().await;

    // No token at all: POS is gated.
    let response = app
        .request(Method::GET, "/api/v1/pos/catalog", None, None)
        .await;
    assert_login_redirect(&response);

    // A cashier cannot open owner reports.
    let (_, cashier_token) = app.user_with_role(Role::Cashier).await;
    let response = app
        .request(
            Method::GET,
            "/api/v1/reports/sales",
            Some(&cashier_token),
            None,
        )
        .await;
    assert_login_redirect(&response);

    // A stock manager is not a cashier.
    let (_, stock_token) = app.user_with_role(Role::StockManager).await;
    let response = app
        .request(
            Method::GET,
            "/api/v1/pos/catalog",
            Some(&stock_token),
            None,
        )
        .await;
    assert_login_redirect(&response);

    // But the stock manager reaches the stock surface.
    let response = app
        .request(
            Method::GET,
            "/api/v1/stock-adjustments",
            Some(&stock_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The storefront stays public.
    let response = app
        .request(Method::GET, "/api/v1/storefront", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_issues_a_token_with_the_role_landing() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "owner", "password": "ownerpass123" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["data"]["access_token"].as_str().unwrap().len() > 20);
    assert_eq!(body["data"]["role"].as_str().unwrap(), "Owner");
    assert_eq!(
        body["data"]["landing"].as_str().unwrap(),
        "/api/v1/reports/sales"
    );

    // The issued token actually opens owner routes.
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    let response = app
        .request(Method::GET, "/api/v1/users", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is a 401.
    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "owner", "password": "wrong" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
