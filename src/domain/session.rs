//! Session domain entity.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::User;
use crate::config::SESSION_TOKEN_BYTES;

/// Server-side session bound to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Opaque token carried by the session cookie
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the expiry should be pushed forward.
    ///
    /// A session is due once `update_age` has passed since its expiry was
    /// last set to `now + expires_in`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, expires_in: Duration, update_age: Duration) -> bool {
        self.expires_at - expires_in + update_age <= now
    }

    /// Seconds until expiry, never negative.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Session paired with its user, as returned by session lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionData {
    pub session: Session,
    pub user: User,
}

/// Request metadata recorded on new sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Data required to open a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub client: ClientInfo,
}

/// Generate a random, URL-safe session token.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
