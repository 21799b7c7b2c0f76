//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::entities::session::{self, ActiveModel, Entity as SessionEntity};
use crate::domain::{NewSession, Session};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, new_session: NewSession) -> AppResult<Session>;

    /// Find session by its cookie token
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>>;

    /// Move a session's expiry to `expires_at`
    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<Session>;

    /// Delete the session holding `token`; returns whether one existed
    async fn delete_by_token(&self, token: &str) -> AppResult<bool>;
}

/// Concrete implementation of SessionRepository
pub struct SessionStore {
    db: DatabaseConnection,
}

impl SessionStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create(&self, new_session: NewSession) -> AppResult<Session> {
        insert_session(&self.db, new_session).await
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Session>> {
        let result = SessionEntity::find()
            .filter(session::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Session::from))
    }

    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<Session> {
        let model = SessionEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = model.into();
        active.expires_at = Set(expires_at);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Session::from(model))
    }

    async fn delete_by_token(&self, token: &str) -> AppResult<bool> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}

/// Insert a session on any connection (plain or transactional).
pub(crate) async fn insert_session<C>(db: &C, new_session: NewSession) -> AppResult<Session>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        token: Set(new_session.token),
        user_id: Set(new_session.user_id),
        expires_at: Set(new_session.expires_at),
        ip_address: Set(new_session.client.ip_address),
        user_agent: Set(new_session.client.user_agent),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(AppError::from)?;

    Ok(Session::from(model))
}
