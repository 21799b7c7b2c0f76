//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, EmailSender, MailError, ResendMailer};
use crate::services::{AuthService, ErrorMonitor, ServiceContainer, Services, SessionCache};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Error monitor wrapping every handler
    pub monitor: Arc<ErrorMonitor>,
    /// Signed session cache
    pub session_cache: Arc<SessionCache>,
    /// Database connection
    pub database: Arc<Database>,
    /// Validated configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state with the Resend mailer built from `config`.
    pub fn from_config(database: Arc<Database>, config: Config) -> Result<Self, MailError> {
        let mailer = Arc::new(ResendMailer::from_config(&config)?);
        if !mailer.is_configured() {
            tracing::warn!("RESEND_API_KEY not set; outgoing email is disabled");
        }
        Ok(Self::with_mailer(database, config, mailer))
    }

    /// Create application state around an explicit mailer.
    pub fn with_mailer(
        database: Arc<Database>,
        config: Config,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), &config, mailer);

        Self {
            auth_service: container.auth(),
            monitor: container.monitor(),
            session_cache: container.session_cache(),
            database,
            config: Arc::new(config),
        }
    }
}
