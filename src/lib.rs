//! Vendoo auth - email/password authentication with cookie sessions
//!
//! Unexpected request failures are reported to an operator by email.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, sessions and passwords
//! - **services**: Authentication, session cache and error monitoring
//! - **infra**: Database, repositories and the mail provider
//! - **api**: HTTP handlers, cookies, middleware and routes
//! - **client**: HTTP client for the auth endpoints
//! - **types**: Shared response types
//! - **utils**: Email templates
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (applies pending migrations)
//! vendoo-auth serve
//!
//! # Inspect migrations
//! vendoo-auth migrate status
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use client::AuthClient;
pub use config::Config;
pub use domain::{Password, Session, SessionData, User};
pub use errors::{AppError, AppResult};
