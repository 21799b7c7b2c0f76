//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::{account, user};
use crate::config::CREDENTIAL_PROVIDER_ID;
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Password hash of the user's credential account, if any
    async fn find_password_hash(&self, user_id: &str) -> AppResult<Option<String>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_password_hash(&self, user_id: &str) -> AppResult<Option<String>> {
        let result = account::Entity::find()
            .filter(account::Column::UserId.eq(user_id))
            .filter(account::Column::ProviderId.eq(CREDENTIAL_PROVIDER_ID))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.and_then(|account| account.password))
    }
}

/// Insert a user together with its credential account.
///
/// Callers run this inside a transaction so both rows land or neither does.
pub(crate) async fn insert_user_with_credential<C>(
    db: &C,
    new_user: NewUser,
    password_hash: String,
) -> AppResult<User>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let user_id = Uuid::new_v4().to_string();

    let user_model = user::ActiveModel {
        id: Set(user_id.clone()),
        name: Set(new_user.name),
        email: Set(new_user.email),
        email_verified: Set(false),
        image: Set(new_user.image),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(map_insert_error)?;

    account::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        account_id: Set(user_id.clone()),
        provider_id: Set(CREDENTIAL_PROVIDER_ID.to_string()),
        user_id: Set(user_id),
        password: Set(Some(password_hash)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(AppError::from)?;

    Ok(User::from(user_model))
}

/// A racing duplicate sign-up trips the unique email index.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UserAlreadyExists,
        _ => AppError::from(err),
    }
}
