mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;
use std::str::FromStr;

use common::{read_json, TestApp};
use shopfront_api::entities::product::Entity as ProductEntity;

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

async fn create_supplier(app: &TestApp, name: &str) -> i32 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/suppliers",
            Some(&app.owner_token),
            Some(json!({ "name": name })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["data"]["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn supplier_names_are_unique() {
    let app = TestApp::new().await;
    create_supplier(&app, "Acme Wholesale").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/suppliers",
            Some(&app.owner_token),
            Some(json!({ "name": "Acme Wholesale" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn purchase_order_total_is_the_sum_of_line_subtotals() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app, "Acme Wholesale").await;
    let soap = app.seed_product("Soap", dec!(1000), 0, None).await;
    let rice = app.seed_product("Rice", dec!(500), 0, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(&app.owner_token),
            Some(json!({
                "supplier_id": supplier_id,
                "items": [
                    { "product_id": soap.id, "quantity": 10, "unit_cost": "700" },
                    { "product_id": rice.id, "quantity": 20, "unit_cost": "300" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let order = &body["data"]["purchase_order"];
    assert_eq!(decimal(&order["total_amount"]), dec!(13000));
    assert_eq!(order["status"].as_str().unwrap(), "Pending");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // Creating the order does not touch stock.
    assert_eq!(stock_of(&app, soap.id).await, 0);
    assert_eq!(stock_of(&app, rice.id).await, 0);
}

#[tokio::test]
async fn receiving_increments_stock_exactly_once() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app, "Acme Wholesale").await;
    let soap = app.seed_product("Soap", dec!(1000), 3, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(&app.owner_token),
            Some(json!({
                "supplier_id": supplier_id,
                "items": [{ "product_id": soap.id, "quantity": 10, "unit_cost": "700" }]
            })),
        )
        .await;
    let order_id =
        read_json(response).await["data"]["purchase_order"]["id"].as_i64().unwrap() as i32;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/receive", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("successfully received"));
    assert_eq!(stock_of(&app, soap.id).await, 13);

    // Receiving again is a reported no-op.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/receive", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already been received"));
    assert_eq!(stock_of(&app, soap.id).await, 13);
}

#[tokio::test]
async fn received_orders_cannot_be_canceled() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app, "Acme Wholesale").await;
    let soap = app.seed_product("Soap", dec!(1000), 0, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(&app.owner_token),
            Some(json!({
                "supplier_id": supplier_id,
                "items": [{ "product_id": soap.id, "quantity": 5, "unit_cost": "700" }]
            })),
        )
        .await;
    let order_id =
        read_json(response).await["data"]["purchase_order"]["id"].as_i64().unwrap() as i32;

    app.request(
        Method::POST,
        &format!("/api/v1/purchase-orders/{}/receive", order_id),
        Some(&app.owner_token),
        None,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/cancel", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pending_orders_can_be_marked_ordered_and_canceled() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app, "Acme Wholesale").await;
    let soap = app.seed_product("Soap", dec!(1000), 0, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/purchase-orders",
            Some(&app.owner_token),
            Some(json!({
                "supplier_id": supplier_id,
                "items": [{ "product_id": soap.id, "quantity": 5, "unit_cost": "700" }]
            })),
        )
        .await;
    let order_id =
        read_json(response).await["data"]["purchase_order"]["id"].as_i64().unwrap() as i32;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/mark-ordered", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"].as_str().unwrap(), "Ordered");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/cancel", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"].as_str().unwrap(), "Canceled");

    // A canceled order can still be received (any non-Received state).
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/purchase-orders/{}/receive", order_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stock_of(&app, soap.id).await, 5);
}

#[tokio::test]
async fn suppliers_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let supplier_id = create_supplier(&app, "Acme Wholesale").await;
    let soap = app.seed_product("Soap", dec!(1000), 0, None).await;

    app.request(
        Method::POST,
        "/api/v1/purchase-orders",
        Some(&app.owner_token),
        Some(json!({
            "supplier_id": supplier_id,
            "items": [{ "product_id": soap.id, "quantity": 1, "unit_cost": "700" }]
        })),
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/suppliers/{}", supplier_id),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A supplier without orders deletes cleanly.
    let lonely = create_supplier(&app, "Lonely Supplies").await;
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/suppliers/{}", lonely),
            Some(&app.owner_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn stock_adjustments_apply_signed_deltas_without_a_floor() {
    let app = TestApp::new().await;
    let prod = app.seed_product("Soap", dec!(1000), 20, None).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-adjustments",
            Some(&app.owner_token),
            Some(json!({
                "product_id": prod.id,
                "quantity_change": -5,
                "adjustment_type": "Remove",
                "notes": "damaged in storage"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["new_stock_quantity"].as_i64().unwrap(), 15);
    assert_eq!(stock_of(&app, prod.id).await, 15);

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-adjustments",
            Some(&app.owner_token),
            Some(json!({
                "product_id": prod.id,
                "quantity_change": 10,
                "adjustment_type": "Add"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(stock_of(&app, prod.id).await, 25);

    // No floor: adjustments may drive stock negative.
    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-adjustments",
            Some(&app.owner_token),
            Some(json!({
                "product_id": prod.id,
                "quantity_change": -30,
                "adjustment_type": "Physical Count"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(stock_of(&app, prod.id).await, -5);

    // A zero delta is rejected.
    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-adjustments",
            Some(&app.owner_token),
            Some(json!({ "product_id": prod.id, "quantity_change": 0 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The ledger keeps every entry, newest first.
    let response = app
        .request(
            Method::GET,
            "/api/v1/stock-adjustments",
            Some(&app.owner_token),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}
