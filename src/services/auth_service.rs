//! Authentication service - Email/password accounts and cookie sessions.
//!
//! Password handling lives in the domain `Password` value object; all
//! persistence goes through the Unit of Work.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::config::{SESSION_EXPIRES_IN_SECONDS, SESSION_UPDATE_AGE_SECONDS};
use crate::domain::{
    generate_session_token, normalize_email, ClientInfo, NewSession, NewUser, Password,
    SessionData,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sign-up request
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub image: Option<String>,
}

/// Sign-in request
#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Result of resolving a session token
#[derive(Debug, Clone)]
pub struct SessionLookup {
    pub data: SessionData,
    /// The expiry was pushed forward, so the session cookie must be re-issued
    pub refreshed: bool,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign it in
    async fn sign_up(&self, input: SignUpInput, client: ClientInfo) -> AppResult<SessionData>;

    /// Verify credentials and open a session
    async fn sign_in(&self, input: SignInInput, client: ClientInfo) -> AppResult<SessionData>;

    /// Revoke the session holding `token`. Unknown tokens are not an error.
    async fn sign_out(&self, token: &str) -> AppResult<()>;

    /// Resolve a session token, sliding its expiry when due
    async fn get_session(&self, token: &str) -> AppResult<Option<SessionLookup>>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    expires_in: Duration,
    update_age: Duration,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service with the default session policy
    pub fn new(uow: Arc<U>) -> Self {
        Self {
            uow,
            expires_in: Duration::seconds(SESSION_EXPIRES_IN_SECONDS),
            update_age: Duration::seconds(SESSION_UPDATE_AGE_SECONDS),
        }
    }

    /// Override session lifetime and refresh threshold
    pub fn with_session_policy(mut self, expires_in: Duration, update_age: Duration) -> Self {
        self.expires_in = expires_in;
        self.update_age = update_age;
        self
    }

    fn new_session(&self, user_id: String, client: ClientInfo) -> NewSession {
        NewSession {
            user_id,
            token: generate_session_token(),
            expires_at: Utc::now() + self.expires_in,
            client,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn sign_up(&self, input: SignUpInput, client: ClientInfo) -> AppResult<SessionData> {
        let email = normalize_email(&input.email);
        if input.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let new_user = NewUser {
            email,
            name: input.name.trim().to_string(),
            image: input.image,
        };
        let expires_in = self.expires_in;

        let data = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.create_user(new_user, password_hash).await?;
                    let session = ctx
                        .create_session(NewSession {
                            user_id: user.id.clone(),
                            token: generate_session_token(),
                            expires_at: Utc::now() + expires_in,
                            client,
                        })
                        .await?;
                    Ok(SessionData { session, user })
                })
            })
            .await?;

        tracing::info!(user_id = %data.user.id, "User signed up");
        Ok(data)
    }

    async fn sign_in(&self, input: SignInInput, client: ClientInfo) -> AppResult<SessionData> {
        let email = normalize_email(&input.email);
        let user = self.uow.users().find_by_email(&email).await?;

        let stored_hash = match &user {
            Some(user) => self.uow.users().find_password_hash(&user.id).await?,
            None => None,
        };

        // Verify against a real hash even for unknown emails so response
        // timing does not reveal which addresses are registered.
        let (stored, has_credential) = match stored_hash {
            Some(hash) => (Password::from_hash(hash), true),
            None => (Password::timing_dummy(), false),
        };
        let password_valid = stored.verify(&input.password);

        let user = match user {
            Some(user) if has_credential && password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let session = self
            .uow
            .sessions()
            .create(self.new_session(user.id.clone(), client))
            .await?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(SessionData { session, user })
    }

    async fn sign_out(&self, token: &str) -> AppResult<()> {
        if self.uow.sessions().delete_by_token(token).await? {
            tracing::info!("Session revoked");
        }
        Ok(())
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<SessionLookup>> {
        let Some(session) = self.uow.sessions().find_by_token(token).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.is_expired(now) {
            self.uow.sessions().delete_by_token(token).await?;
            return Ok(None);
        }

        let Some(user) = self.uow.users().find_by_id(&session.user_id).await? else {
            tracing::warn!(session_id = %session.id, "Session references a missing user");
            return Ok(None);
        };

        if session.needs_refresh(now, self.expires_in, self.update_age) {
            let session = self
                .uow
                .sessions()
                .extend(&session.id, now + self.expires_in)
                .await?;
            return Ok(Some(SessionLookup {
                data: SessionData { session, user },
                refreshed: true,
            }));
        }

        Ok(Some(SessionLookup {
            data: SessionData { session, user },
            refreshed: false,
        }))
    }
}
