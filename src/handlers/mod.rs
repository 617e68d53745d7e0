//! HTTP handlers. Thin: validate the request, call one service method,
//! shape the response.

pub mod common;
pub mod customers;
pub mod expenses;
pub mod pos;
pub mod products;
pub mod purchase_orders;
pub mod reports;
pub mod stock_adjustments;
pub mod suppliers;
pub mod users;
