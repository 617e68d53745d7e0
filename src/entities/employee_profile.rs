use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee role. Authorization decisions match exhaustively on this enum;
/// there is no attribute probing anywhere.
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
pub enum Role {
    #[sea_orm(string_value = "Owner")]
    Owner,
    #[sea_orm(string_value = "Cashier")]
    Cashier,
    #[sea_orm(string_value = "Stock Manager")]
    #[serde(rename = "Stock Manager")]
    #[strum(serialize = "Stock Manager")]
    StockManager,
}

/// Extends the account record with employee-specific information.
/// Strictly one profile per user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// The associated user account
    pub user_id: i32,

    pub phone_number: Option<String>,

    /// The role of the employee
    pub role: Role,

    /// Date when the employee joined
    pub date_joined: DateTime<Utc>,

    /// Is this employee currently active?
    pub is_active_employee: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
