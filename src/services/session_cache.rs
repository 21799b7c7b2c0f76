//! Signed session cache.
//!
//! Session lookups are cached client-side in a short-lived HS256 token so
//! that repeated reads inside the cache window skip the store.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::SessionData;
use crate::errors::AppResult;

#[derive(Debug, Serialize, Deserialize)]
struct CacheClaims {
    #[serde(flatten)]
    data: SessionData,
    iat: i64,
    exp: i64,
}

/// Encodes and verifies session cache values
pub struct SessionCache {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age: Duration,
}

impl SessionCache {
    /// Create a cache signer from the auth secret.
    pub fn new(secret: &[u8], max_age_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            max_age: Duration::seconds(max_age_seconds),
        }
    }

    /// Cache lifetime in seconds.
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age.num_seconds()
    }

    /// Sign `data`. The value never outlives the session it carries.
    pub fn encode(&self, data: &SessionData) -> AppResult<String> {
        let now = Utc::now();
        let exp = (now + self.max_age).min(data.session.expires_at);

        let claims = CacheClaims {
            data: data.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify a cache value; tampered or expired values yield `None`.
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<CacheClaims>(value, &self.decoding_key, &validation) {
            Ok(token) => Some(token.claims.data),
            Err(e) => {
                tracing::debug!("Ignoring session cache value: {}", e);
                None
            }
        }
    }
}
