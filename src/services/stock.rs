use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        product::{self, Entity as Product},
        stock_adjustment::{self, AdjustmentType, Entity as StockAdjustment},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::txn_err,
};

#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustmentInput {
    pub product_id: i32,
    pub quantity_change: i32,
    pub adjustment_type: AdjustmentType,
    pub notes: Option<String>,
}

/// An applied adjustment together with the resulting stock level.
#[derive(Debug, Serialize)]
pub struct AppliedAdjustment {
    pub adjustment: stock_adjustment::Model,
    pub new_stock_quantity: i32,
}

/// Manual stock adjustments. Unlike sales there is no negative-stock guard
/// here; the operator owns the ledger.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Persists the adjustment row and applies the same signed delta to the
    /// product's stock in one transaction.
    #[instrument(skip(self, input), fields(product_id = input.product_id))]
    pub async fn create_adjustment(
        &self,
        user_id: i32,
        input: StockAdjustmentInput,
    ) -> Result<AppliedAdjustment, ServiceError> {
        if input.quantity_change == 0 {
            return Err(ServiceError::ValidationError(
                "Quantity change cannot be zero".to_string(),
            ));
        }

        let applied = self
            .db
            .transaction::<_, AppliedAdjustment, ServiceError>(move |txn| {
                Box::pin(async move {
                    let prod = Product::find_by_id(input.product_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::not_found("Product", input.product_id))?;

                    let adjustment = stock_adjustment::ActiveModel {
                        product_id: Set(prod.id),
                        quantity_change: Set(input.quantity_change),
                        adjustment_type: Set(input.adjustment_type),
                        notes: Set(input.notes.clone()),
                        adjusted_by: Set(Some(user_id)),
                        adjustment_date: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    Product::update_many()
                        .col_expr(
                            product::Column::StockQuantity,
                            Expr::col(product::Column::StockQuantity).add(input.quantity_change),
                        )
                        .filter(product::Column::Id.eq(prod.id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let new_stock_quantity = prod.stock_quantity + input.quantity_change;

                    Ok(AppliedAdjustment {
                        adjustment,
                        new_stock_quantity,
                    })
                })
            })
            .await
            .map_err(txn_err)?;

        info!(
            product_id = applied.adjustment.product_id,
            quantity_change = applied.adjustment.quantity_change,
            new_quantity = applied.new_stock_quantity,
            adjustment_type = %applied.adjustment.adjustment_type,
            "Stock adjustment applied"
        );

        self.event_sender
            .send_or_log(Event::StockAdjusted {
                product_id: applied.adjustment.product_id,
                quantity_change: applied.adjustment.quantity_change,
                new_quantity: applied.new_stock_quantity,
            })
            .await;

        Ok(applied)
    }

    /// Adjustment ledger, newest first.
    #[instrument(skip(self))]
    pub async fn list_adjustments(
        &self,
    ) -> Result<Vec<stock_adjustment::Model>, ServiceError> {
        let db = &*self.db;
        StockAdjustment::find()
            .order_by_desc(stock_adjustment::Column::AdjustmentDate)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustment_types_render_as_the_original_reason_codes() {
        assert_eq!(AdjustmentType::Add.to_string(), "Add");
        assert_eq!(AdjustmentType::PhysicalCount.to_string(), "Physical Count");
    }
}
