//! Service layer. Every multi-step mutation runs inside a single database
//! transaction owned by the service method; handlers never touch the
//! connection directly.

pub mod accounts;
pub mod catalog;
pub mod customers;
pub mod expenses;
pub mod notifications;
pub mod purchasing;
pub mod reports;
pub mod sales;
pub mod stock;

use crate::errors::ServiceError;
use sea_orm::TransactionError;

/// Collapses sea-orm's transaction error wrapper back into our error type.
pub(crate) fn txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
