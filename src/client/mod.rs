//! Client-side auth facade.
//!
//! A cookie-holding HTTP client for the auth endpoints that also
//! publishes the current session to subscribers.

mod auth_client;

pub use auth_client::{AuthClient, ClientError, SignInParams, SignUpParams};
