use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    entities::{
        employee_profile::{self, Entity as EmployeeProfile, Role},
        user::{self, Entity as User},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::txn_err,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Role,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// A user account with its employee profile.
#[derive(Debug, Serialize)]
pub struct UserWithProfile {
    pub user: user::Model,
    pub profile: Option<employee_profile::Model>,
}

/// Account management: users, their employee profiles, and password login.
///
/// Creating an account always creates its linked profile as one atomic step;
/// the implicit save-signal mechanism of the original was replaced with this
/// explicit call.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl AccountService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(
        &self,
        input: CreateUserInput,
    ) -> Result<(user::Model, employee_profile::Model), ServiceError> {
        if input.username.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let (created_user, profile) = self
            .db
            .transaction::<_, (user::Model, employee_profile::Model), ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = User::find()
                        .filter(user::Column::Username.eq(input.username.as_str()))
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if existing > 0 {
                        return Err(ServiceError::Conflict(format!(
                            "Username {} is already taken",
                            input.username
                        )));
                    }

                    let now = Utc::now();
                    let created = user::ActiveModel {
                        username: Set(input.username.clone()),
                        email: Set(input.email.clone()),
                        password_hash: Set(password_hash),
                        is_superuser: Set(input.is_superuser),
                        is_active: Set(true),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    let profile = employee_profile::ActiveModel {
                        user_id: Set(created.id),
                        phone_number: Set(input.phone_number.clone()),
                        role: Set(input.role),
                        date_joined: Set(now),
                        is_active_employee: Set(true),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    Ok((created, profile))
                })
            })
            .await
            .map_err(txn_err)?;

        info!(
            user_id = created_user.id,
            role = %profile.role,
            "User created with employee profile"
        );

        self.event_sender
            .send_or_log(Event::UserCreated {
                user_id: created_user.id,
            })
            .await;

        Ok((created_user, profile))
    }

    /// All users with their profiles, ordered by username.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserWithProfile>, ServiceError> {
        let db = &*self.db;

        let rows = User::find()
            .order_by_asc(user::Column::Username)
            .find_with_related(EmployeeProfile)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(u, mut profiles)| UserWithProfile {
                user: u,
                profile: profiles.pop(),
            })
            .collect())
    }

    /// Verifies credentials and returns the account with its profile.
    ///
    /// The error message is deliberately identical for unknown usernames and
    /// wrong passwords.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(user::Model, employee_profile::Model), ServiceError> {
        let db = &*self.db;

        let invalid = || ServiceError::AuthError("Invalid username or password".to_string());

        let account = User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(invalid)?;

        verify_password(password, &account.password_hash).map_err(|_| invalid())?;

        if !account.is_active {
            return Err(ServiceError::AuthError("Account is inactive".to_string()));
        }

        let profile = EmployeeProfile::find()
            .filter(employee_profile::Column::UserId.eq(account.id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::AuthError("Account has no employee profile".to_string())
            })?;

        if !profile.is_active_employee {
            return Err(ServiceError::AuthError(
                "Employee is no longer active".to_string(),
            ));
        }

        Ok((account, profile))
    }
}

/// Role-appropriate landing route, mirroring the original's post-login
/// redirect (owner dashboard / stock dashboard / register).
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Owner => "/api/v1/reports/sales",
        Role::StockManager => "/api/v1/reports/low-stock",
        Role::Cashier => "/api/v1/pos/catalog",
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ServiceError::InternalError(format!("Corrupt password hash: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ServiceError::AuthError("Invalid username or password".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse battery staple").expect("hash");
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn landing_path_depends_on_role() {
        assert_eq!(landing_path(Role::Owner), "/api/v1/reports/sales");
        assert_eq!(landing_path(Role::StockManager), "/api/v1/reports/low-stock");
        assert_eq!(landing_path(Role::Cashier), "/api/v1/pos/catalog");
    }
}
