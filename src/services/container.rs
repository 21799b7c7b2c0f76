//! Service Container - Centralized service access.
//!
//! Handlers reach every service through the container, which depends
//! on service traits rather than implementations.

use std::sync::Arc;

use super::{AuthService, Authenticator, ErrorMonitor, SessionCache};
use crate::config::{Config, SESSION_CACHE_MAX_AGE_SECONDS};
use crate::infra::{EmailSender, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get the error monitor wrapping request handlers
    fn monitor(&self) -> Arc<ErrorMonitor>;

    /// Get the signed session cache
    fn session_cache(&self) -> Arc<SessionCache>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    monitor: Arc<ErrorMonitor>,
    session_cache: Arc<SessionCache>,
}

impl Services {
    /// Wire every service from a database connection, config and mailer
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: &Config,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow)),
            monitor: Arc::new(ErrorMonitor::new(
                mailer,
                config.error_notification_email.clone(),
            )),
            session_cache: Arc::new(SessionCache::new(
                config.auth_secret_bytes(),
                SESSION_CACHE_MAX_AGE_SECONDS,
            )),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn monitor(&self) -> Arc<ErrorMonitor> {
        self.monitor.clone()
    }

    fn session_cache(&self) -> Arc<SessionCache> {
        self.session_cache.clone()
    }
}
