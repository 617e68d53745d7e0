use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product entity
///
/// Stock quantity and the reorder threshold live directly on the product
/// row. Products are never hard-deleted while referenced by sale or
/// purchase-order lines; removal from the catalog flips `is_active`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Product name
    #[validate(length(
        min = 1,
        max = 200,
        message = "Product name must be between 1 and 200 characters"
    ))]
    pub name: String,

    /// Detailed description of the product
    pub description: Option<String>,

    /// Selling price of the product
    pub price: Decimal,

    /// Category the product belongs to
    pub category_id: Option<i32>,

    /// Current quantity of product in stock
    pub stock_quantity: i32,

    /// Minimum stock quantity to trigger a reorder alert
    pub reorder_level: i32,

    /// Is the product currently available for sale?
    pub is_active: bool,

    /// Unique barcode for the product
    #[validate(length(max = 100, message = "Barcode cannot exceed 100 characters"))]
    pub barcode: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Human-readable stock status used by catalog listings.
impl Model {
    pub fn stock_status(&self) -> &'static str {
        if self.stock_quantity <= 0 {
            "Out of Stock"
        } else if self.stock_quantity <= self.reorder_level {
            "Low Stock - Reorder Soon!"
        } else {
            "In Stock"
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::sale_item::Entity")]
    SaleItems,
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    PurchaseOrderItems,
    #[sea_orm(has_many = "super::stock_adjustment::Entity")]
    StockAdjustments,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sale_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderItems.def()
    }
}

impl Related<super::stock_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustments.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.is_active {
                active_model.is_active = Set(true);
            }
            if let ActiveValue::NotSet = active_model.reorder_level {
                active_model.reorder_level = Set(10);
            }
            if let ActiveValue::NotSet = active_model.stock_quantity {
                active_model.stock_quantity = Set(0);
            }
            active_model.created_at = Set(Utc::now());
        }

        active_model.updated_at = Set(Some(Utc::now()));

        Ok(active_model)
    }
}
