use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account record. Every user gets an employee profile in the same
/// transaction that creates the account; there is no reactive save hook.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub username: String,

    pub email: Option<String>,

    /// Argon2 hash, never the plain password
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_superuser: bool,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_profile::Entity")]
    EmployeeProfile,
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::employee_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeProfile.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
