use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reason code for a manual stock adjustment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AdjustmentType {
    /// Addition (e.g., found inventory)
    #[sea_orm(string_value = "Add")]
    Add,
    /// Removal (e.g., damaged, lost, spoilage)
    #[sea_orm(string_value = "Remove")]
    Remove,
    /// Customer return
    #[sea_orm(string_value = "Return")]
    Return,
    /// Adjustment after physical count
    #[sea_orm(string_value = "Physical Count")]
    #[serde(rename = "Physical Count")]
    #[strum(serialize = "Physical Count")]
    PhysicalCount,
    #[sea_orm(string_value = "Other")]
    Other,
}

/// Manual stock ledger entry. Applying it adds `quantity_change` (signed) to
/// the product's stock; no negative-stock floor is enforced here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,

    /// The amount by which stock changed (positive for increase, negative
    /// for decrease)
    pub quantity_change: i32,

    pub adjustment_type: AdjustmentType,

    /// Reason or additional details for the adjustment
    pub notes: Option<String>,

    /// User who made the adjustment
    pub adjusted_by: Option<i32>,

    pub adjustment_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdjustedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
