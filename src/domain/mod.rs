//! Domain layer - Core business entities and logic
//!
//! Users, sessions and the password value object, independent of
//! persistence and HTTP concerns.

pub mod password;
pub mod session;
pub mod user;

pub use password::Password;
pub use session::{generate_session_token, ClientInfo, NewSession, Session, SessionData};
pub use user::{normalize_email, NewUser, User};
