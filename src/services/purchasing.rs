use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        product::{self, Entity as Product},
        purchase_order::{self, Entity as PurchaseOrder, PurchaseOrderStatus},
        purchase_order_item::{self, Entity as PurchaseOrderItem},
        supplier::{self, Entity as Supplier},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::txn_err,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrderLineInput {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: i32,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseOrderLineInput>,
}

/// Purchase order with its lines.
#[derive(Debug, Serialize)]
pub struct PurchaseOrderDetail {
    pub purchase_order: purchase_order::Model,
    pub items: Vec<purchase_order_item::Model>,
    pub supplier_name: String,
}

/// Result of a receive call. Receiving an already-received order is a no-op
/// that reports the fact instead of double-applying stock.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReceiveOutcome {
    Received { purchase_order: purchase_order::Model },
    AlreadyReceived { purchase_order: purchase_order::Model },
}

/// Suppliers and purchase orders.
#[derive(Clone)]
pub struct PurchasingService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl PurchasingService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    // ---- Suppliers ----

    #[instrument(skip(self, input))]
    pub async fn create_supplier(
        &self,
        input: SupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;

        let existing = Supplier::find()
            .filter(supplier::Column::Name.eq(input.name.as_str()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} already exists",
                input.name
            )));
        }

        let created = supplier::ActiveModel {
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            phone_number: Set(input.phone_number),
            email: Set(input.email),
            address: Set(input.address),
            notes: Set(input.notes),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(supplier_id = created.id, name = %created.name, "Supplier created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_supplier(
        &self,
        id: i32,
        input: SupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;

        let existing = Supplier::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))?;

        let clash = Supplier::find()
            .filter(supplier::Column::Name.eq(input.name.as_str()))
            .filter(supplier::Column::Id.ne(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if clash > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} already exists",
                input.name
            )));
        }

        let mut active: supplier::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.contact_person = Set(input.contact_person);
        active.phone_number = Set(input.phone_number);
        active.email = Set(input.email);
        active.address = Set(input.address);
        active.notes = Set(input.notes);

        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Deletion is rejected while purchase orders reference the supplier.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;

        Supplier::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))?;

        let referencing = PurchaseOrder::find()
            .filter(purchase_order::Column::SupplierId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} has {} purchase orders and cannot be deleted",
                id, referencing
            )));
        }

        Supplier::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: i32) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        Supplier::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        let db = &*self.db;
        Supplier::find()
            .order_by_asc(supplier::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    // ---- Purchase orders ----

    /// Creates a purchase order with its lines; the header total is the sum
    /// of line subtotals (quantity × unit_cost), written in the same
    /// transaction.
    #[instrument(skip(self, input), fields(supplier_id = input.supplier_id))]
    pub async fn create_purchase_order(
        &self,
        user_id: i32,
        input: CreatePurchaseOrderInput,
    ) -> Result<PurchaseOrderDetail, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A purchase order must contain at least one line".to_string(),
            ));
        }

        let detail = self
            .db
            .transaction::<_, PurchaseOrderDetail, ServiceError>(move |txn| {
                Box::pin(async move {
                    let supplier_model = Supplier::find_by_id(input.supplier_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::not_found("Supplier", input.supplier_id)
                        })?;

                    let header = purchase_order::ActiveModel {
                        supplier_id: Set(supplier_model.id),
                        order_date: Set(Utc::now()),
                        expected_delivery_date: Set(input.expected_delivery_date),
                        total_amount: Set(Decimal::ZERO),
                        status: Set(PurchaseOrderStatus::Pending),
                        created_by: Set(Some(user_id)),
                        notes: Set(input.notes.clone()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let mut total = Decimal::ZERO;
                    let mut items = Vec::with_capacity(input.items.len());
                    let mut seen_products = std::collections::HashSet::new();

                    for (idx, line) in input.items.iter().enumerate() {
                        let line_no = idx + 1;

                        if line.quantity <= 0 {
                            return Err(ServiceError::ValidationError(format!(
                                "line {}: quantity must be positive",
                                line_no
                            )));
                        }
                        if line.unit_cost < Decimal::ZERO {
                            return Err(ServiceError::ValidationError(format!(
                                "line {}: unit cost cannot be negative",
                                line_no
                            )));
                        }
                        if !seen_products.insert(line.product_id) {
                            return Err(ServiceError::ValidationError(format!(
                                "line {}: product {} appears more than once in the order",
                                line_no, line.product_id
                            )));
                        }

                        Product::find_by_id(line.product_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "line {}: product {} not found",
                                    line_no, line.product_id
                                ))
                            })?;

                        let subtotal = line.unit_cost * Decimal::from(line.quantity);
                        let item = purchase_order_item::ActiveModel {
                            purchase_order_id: Set(header.id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity),
                            unit_cost: Set(line.unit_cost),
                            subtotal: Set(subtotal),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                        total += subtotal;
                        items.push(item);
                    }

                    let mut header_update: purchase_order::ActiveModel = header.into();
                    header_update.total_amount = Set(total);
                    let header = header_update
                        .update(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(PurchaseOrderDetail {
                        purchase_order: header,
                        items,
                        supplier_name: supplier_model.name,
                    })
                })
            })
            .await
            .map_err(txn_err)?;

        info!(
            purchase_order_id = detail.purchase_order.id,
            total = %detail.purchase_order.total_amount,
            "Purchase order created"
        );

        self.event_sender
            .send_or_log(Event::PurchaseOrderCreated {
                purchase_order_id: detail.purchase_order.id,
                supplier_id: detail.purchase_order.supplier_id,
            })
            .await;

        Ok(detail)
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = &*self.db;
        PurchaseOrder::find()
            .order_by_desc(purchase_order::Column::OrderDate)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_order(&self, id: i32) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = &*self.db;

        let header = PurchaseOrder::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

        let items = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let supplier_name = Supplier::find_by_id(header.supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .map(|s| s.name)
            .unwrap_or_default();

        Ok(PurchaseOrderDetail {
            purchase_order: header,
            items,
            supplier_name,
        })
    }

    /// Receives a purchase order: every line's quantity is added to its
    /// product's stock and the status becomes Received, all in one
    /// transaction. A second receive finds the order already Received and
    /// changes nothing.
    #[instrument(skip(self))]
    pub async fn receive_purchase_order(&self, id: i32) -> Result<ReceiveOutcome, ServiceError> {
        let outcome = self
            .db
            .transaction::<_, ReceiveOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = PurchaseOrder::find_by_id(id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

                    if header.status == PurchaseOrderStatus::Received {
                        return Ok(ReceiveOutcome::AlreadyReceived {
                            purchase_order: header,
                        });
                    }

                    let items = PurchaseOrderItem::find()
                        .filter(purchase_order_item::Column::PurchaseOrderId.eq(id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    for item in &items {
                        Product::update_many()
                            .col_expr(
                                product::Column::StockQuantity,
                                Expr::col(product::Column::StockQuantity).add(item.quantity),
                            )
                            .filter(product::Column::Id.eq(item.product_id))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                    }

                    let mut header_update: purchase_order::ActiveModel = header.into();
                    header_update.status = Set(PurchaseOrderStatus::Received);
                    let header = header_update
                        .update(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(ReceiveOutcome::Received {
                        purchase_order: header,
                    })
                })
            })
            .await
            .map_err(txn_err)?;

        if let ReceiveOutcome::Received { purchase_order } = &outcome {
            info!(
                purchase_order_id = purchase_order.id,
                "Purchase order received, stock updated"
            );
            self.event_sender
                .send_or_log(Event::PurchaseOrderReceived {
                    purchase_order_id: purchase_order.id,
                })
                .await;
        }

        Ok(outcome)
    }

    /// Pending → Ordered. Any other starting status is rejected.
    #[instrument(skip(self))]
    pub async fn mark_ordered(&self, id: i32) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;

        let header = PurchaseOrder::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

        if header.status != PurchaseOrderStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Purchase order {} is {} and cannot be marked ordered",
                id, header.status
            )));
        }

        let mut update: purchase_order::ActiveModel = header.into();
        update.status = Set(PurchaseOrderStatus::Ordered);
        update.update(db).await.map_err(ServiceError::db_error)
    }

    /// Cancels an order that has not been received. Stock is untouched.
    #[instrument(skip(self))]
    pub async fn cancel_purchase_order(
        &self,
        id: i32,
    ) -> Result<purchase_order::Model, ServiceError> {
        let db = &*self.db;

        let header = PurchaseOrder::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Purchase order", id))?;

        if header.status == PurchaseOrderStatus::Received {
            return Err(ServiceError::InvalidOperation(format!(
                "Purchase order {} has been received and cannot be canceled",
                id
            )));
        }

        let mut update: purchase_order::ActiveModel = header.into();
        update.status = Set(PurchaseOrderStatus::Canceled);
        update.update(db).await.map_err(ServiceError::db_error)
    }
}
