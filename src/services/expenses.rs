use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        expense::{self, Entity as Expense},
        expense_category::{self, Entity as ExpenseCategory},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseInput {
    pub category_id: i32,
    pub amount: Decimal,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Filters for the expense listing. Date strings are parsed as `%Y-%m-%d`;
/// an unparsable value is reported as a warning and the filter is skipped,
/// mirroring the original behavior.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseListFilter {
    pub category: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Expense with its category name, for listings.
#[derive(Debug, Serialize)]
pub struct ExpenseRow {
    pub expense: expense::Model,
    pub category_name: String,
}

#[derive(Debug, Serialize)]
pub struct ExpenseListing {
    pub expenses: Vec<ExpenseRow>,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct ExpenseService {
    db: Arc<DbPool>,
}

impl ExpenseService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<expense_category::Model, ServiceError> {
        let db = &*self.db;

        let existing = ExpenseCategory::find()
            .filter(expense_category::Column::Name.eq(name.as_str()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Expense category {} already exists",
                name
            )));
        }

        expense_category::ActiveModel {
            name: Set(name),
            description: Set(description),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<expense_category::Model>, ServiceError> {
        let db = &*self.db;
        ExpenseCategory::find()
            .order_by_asc(expense_category::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletion is rejected while expenses reference the category.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;

        ExpenseCategory::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Expense category", id))?;

        let referencing = Expense::find()
            .filter(expense::Column::CategoryId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Expense category {} has {} expenses and cannot be deleted",
                id, referencing
            )));
        }

        ExpenseCategory::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    #[instrument(skip(self, input), fields(category_id = input.category_id))]
    pub async fn create_expense(
        &self,
        user_id: i32,
        input: CreateExpenseInput,
    ) -> Result<expense::Model, ServiceError> {
        let db = &*self.db;

        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Expense amount must be positive".to_string(),
            ));
        }

        ExpenseCategory::find_by_id(input.category_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Expense category", input.category_id))?;

        let created = expense::ActiveModel {
            category_id: Set(input.category_id),
            amount: Set(input.amount),
            date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
            description: Set(input.description),
            recorded_by: Set(Some(user_id)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(expense_id = created.id, amount = %created.amount, "Expense recorded");
        Ok(created)
    }

    /// Expenses with category names, newest first, with optional category
    /// and date-range filters.
    #[instrument(skip(self))]
    pub async fn list_expenses(
        &self,
        filter: ExpenseListFilter,
    ) -> Result<ExpenseListing, ServiceError> {
        let db = &*self.db;
        let mut warnings = Vec::new();

        let mut query = Expense::find();

        if let Some(category_id) = filter.category {
            query = query.filter(expense::Column::CategoryId.eq(category_id));
        }

        if let Some(raw) = filter.start_date.as_deref() {
            match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(start) => query = query.filter(expense::Column::Date.gte(start)),
                Err(_) => warnings.push("Invalid start date format.".to_string()),
            }
        }
        if let Some(raw) = filter.end_date.as_deref() {
            match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(end) => query = query.filter(expense::Column::Date.lte(end)),
                Err(_) => warnings.push("Invalid end date format.".to_string()),
            }
        }

        let rows = query
            .order_by_desc(expense::Column::Date)
            .order_by_desc(expense::Column::CreatedAt)
            .find_also_related(ExpenseCategory)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let expenses = rows
            .into_iter()
            .map(|(exp, cat)| ExpenseRow {
                expense: exp,
                category_name: cat.map(|c| c.name).unwrap_or_default(),
            })
            .collect();

        Ok(ExpenseListing { expenses, warnings })
    }
}
