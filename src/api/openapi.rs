//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::auth_handler;
use crate::config::SESSION_TOKEN_COOKIE;
use crate::domain::{Session, SessionData, User};
use crate::types::SuccessResponse;

/// OpenAPI documentation for the auth service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vendoo Auth",
        version = "0.1.0",
        description = "Email/password authentication with cookie sessions"
    ),
    paths(
        auth_handler::sign_up_email,
        auth_handler::sign_in_email,
        auth_handler::get_session,
        auth_handler::sign_out,
    ),
    components(
        schemas(
            User,
            Session,
            SessionData,
            SuccessResponse,
            auth_handler::SignUpRequest,
            auth_handler::SignInRequest,
            auth_handler::SignUpResponse,
            auth_handler::SignInResponse,
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "Authentication", description = "Sign-up, sign-in, sessions and sign-out")
    )
)]
pub struct ApiDoc;

/// Documents the session cookie as the auth mechanism
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_TOKEN_COOKIE))),
            );
        }
    }
}
