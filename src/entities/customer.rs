use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Customer contact record, optionally linked from sales.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Customer's first name
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    pub last_name: Option<String>,

    /// Customer's email address (optional, but recommended)
    #[validate(email)]
    pub email: Option<String>,

    pub phone_number: Option<String>,

    pub address: Option<String>,

    pub notes: Option<String>,

    /// Date when the customer was added
    pub date_joined: DateTime<Utc>,

    /// Date of customer's last purchase
    pub last_purchase: Option<DateTime<Utc>>,
}

impl Model {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
