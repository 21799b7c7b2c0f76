//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Unit of Work for transaction management
//! - Outbound mail delivery

pub mod db;
pub mod mailer;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use mailer::{EmailMessage, EmailSender, MailError, ResendMailer};
pub use repositories::{SessionRepository, SessionStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use mailer::MockEmailSender;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockSessionRepository, MockUserRepository};
