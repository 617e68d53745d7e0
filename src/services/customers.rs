use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        customer::{self, Entity as Customer},
        sale::{self, Entity as Sale},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Customer with their purchase history, newest first.
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    pub customer: customer::Model,
    pub sales: Vec<sale::Model>,
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create_customer(
        &self,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let db = &*self.db;

        if let Some(email) = input.email.as_deref() {
            let existing = Customer::find()
                .filter(customer::Column::Email.eq(email))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            if existing > 0 {
                return Err(ServiceError::Conflict(format!(
                    "A customer with email {} already exists",
                    email
                )));
            }
        }

        let created = customer::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone_number: Set(input.phone_number),
            address: Set(input.address),
            notes: Set(input.notes),
            date_joined: Set(Utc::now()),
            last_purchase: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(customer_id = created.id, "Customer created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_customer(
        &self,
        id: i32,
        input: CustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let db = &*self.db;

        let existing = Customer::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Customer", id))?;

        if let Some(email) = input.email.as_deref() {
            let clash = Customer::find()
                .filter(customer::Column::Email.eq(email))
                .filter(customer::Column::Id.ne(id))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            if clash > 0 {
                return Err(ServiceError::Conflict(format!(
                    "A customer with email {} already exists",
                    email
                )));
            }
        }

        let mut active: customer::ActiveModel = existing.into();
        active.first_name = Set(input.first_name);
        active.last_name = Set(input.last_name);
        active.email = Set(input.email);
        active.phone_number = Set(input.phone_number);
        active.address = Set(input.address);
        active.notes = Set(input.notes);

        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// All customers ordered by first then last name, like the register's
    /// customer picker.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        let db = &*self.db;
        Customer::find()
            .order_by_asc(customer::Column::FirstName)
            .order_by_asc(customer::Column::LastName)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_customer_detail(&self, id: i32) -> Result<CustomerDetail, ServiceError> {
        let db = &*self.db;

        let customer_model = Customer::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Customer", id))?;

        let sales = Sale::find()
            .filter(sale::Column::CustomerId.eq(id))
            .order_by_desc(sale::Column::SaleDate)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(CustomerDetail {
            customer: customer_model,
            sales,
        })
    }
}
