use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        category::{self, Entity as Category},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<i32>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub reorder_level: Option<i32>,
    pub barcode: Option<String>,
    pub is_active: Option<bool>,
}

/// Product catalog service: products, categories, barcode lookup and the
/// low-stock query.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Active products ordered by name (the public storefront listing).
    #[instrument(skip(self))]
    pub async fn list_active_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;
        Product::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Every product, active or not, for the management screens.
    #[instrument(skip(self))]
    pub async fn list_all_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;
        Product::find()
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Active products with stock on hand, for the register screen.
    #[instrument(skip(self))]
    pub async fn list_sellable_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;
        Product::find()
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::StockQuantity.gt(0))
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> Result<product::Model, ServiceError> {
        let db = &*self.db;
        Product::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    /// Barcode lookup for the register: the product must be active and in
    /// stock, otherwise the result is a not-found error.
    #[instrument(skip(self))]
    pub async fn find_by_barcode(&self, barcode: &str) -> Result<product::Model, ServiceError> {
        let db = &*self.db;
        Product::find()
            .filter(product::Column::Barcode.eq(barcode))
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::StockQuantity.gt(0))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound("Product not found or out of stock".to_string())
            })
    }

    /// Active products at or below their reorder level, ordered by name.
    #[instrument(skip(self))]
    pub async fn low_stock_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db;
        Product::find()
            .filter(product::Column::IsActive.eq(true))
            .filter(
                Expr::col(product::Column::StockQuantity)
                    .lte(Expr::col(product::Column::ReorderLevel)),
            )
            .order_by_asc(product::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;

        if input.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        if let Some(category_id) = input.category_id {
            Category::find_by_id(category_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::not_found("Category", category_id))?;
        }

        if let Some(barcode) = input.barcode.as_deref() {
            let existing = Product::find()
                .filter(product::Column::Barcode.eq(barcode))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            if existing > 0 {
                return Err(ServiceError::Conflict(format!(
                    "A product with barcode {} already exists",
                    barcode
                )));
            }
        }

        let created = product::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            category_id: Set(input.category_id),
            stock_quantity: Set(input.stock_quantity.unwrap_or(0)),
            reorder_level: Set(input.reorder_level.unwrap_or(10)),
            barcode: Set(input.barcode),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: i32,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;

        let existing = self.get_product(id).await?;

        if let Some(category_id) = input.category_id {
            Category::find_by_id(category_id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::not_found("Category", category_id))?;
        }

        if let Some(barcode) = input.barcode.as_deref() {
            let clash = Product::find()
                .filter(product::Column::Barcode.eq(barcode))
                .filter(product::Column::Id.ne(id))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            if clash > 0 {
                return Err(ServiceError::Conflict(format!(
                    "A product with barcode {} already exists",
                    barcode
                )));
            }
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
            active.price = Set(price);
        }
        if input.category_id.is_some() {
            active.category_id = Set(input.category_id);
        }
        if let Some(reorder_level) = input.reorder_level {
            active.reorder_level = Set(reorder_level);
        }
        if input.barcode.is_some() {
            active.barcode = Set(input.barcode);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.update(db).await.map_err(ServiceError::db_error)
    }

    /// Soft delete: the product stays for historical sale references but
    /// disappears from the catalog and the register.
    #[instrument(skip(self))]
    pub async fn deactivate_product(&self, id: i32) -> Result<product::Model, ServiceError> {
        let db = &*self.db;
        let existing = self.get_product(id).await?;
        let mut active: product::ActiveModel = existing.into();
        active.is_active = Set(false);
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;
        info!(product_id = id, "Product deactivated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db;
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<category::Model, ServiceError> {
        let db = &*self.db;

        let existing = Category::find()
            .filter(category::Column::Name.eq(name.as_str()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Category {} already exists",
                name
            )));
        }

        category::ActiveModel {
            name: Set(name),
            description: Set(description),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }
}
