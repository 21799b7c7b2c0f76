//! Authentication handlers.
//!
//! Every handler body runs under the error monitor, so unexpected
//! failures are reported before the response is built.

use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::cookies;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{ClientInfo, SessionData, User};
use crate::errors::AppResult;
use crate::services::{RequestContext, SignInInput, SignUpInput};
use crate::types::SuccessResponse;

/// Email sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (8 to 128 characters)
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    #[schema(example = "SecurePass123!", min_length = 8, max_length = 128)]
    pub password: String,
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,
    /// Optional avatar URL
    #[validate(url(message = "Invalid image URL"))]
    pub image: Option<String>,
}

/// Email sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Sign-up response; the session cookies are set alongside
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    /// Session token (also set as a cookie)
    pub token: String,
    pub user: User,
}

/// Sign-in response; the session cookies are set alongside
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    /// Always `false` for email sign-in
    pub redirect: bool,
    /// Session token (also set as a cookie)
    pub token: String,
    pub user: User,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up/email", post(sign_up_email))
        .route("/sign-in/email", post(sign_in_email))
        .route("/get-session", get(get_session))
        .route("/sign-out", post(sign_out))
}

/// Sign the session into both cookies
fn issue_session(state: &AppState, jar: CookieJar, data: &SessionData) -> AppResult<CookieJar> {
    let cache_value = state.session_cache.encode(data)?;
    Ok(cookies::set_session_cookies(
        jar,
        data,
        cache_value,
        state.session_cache.max_age_seconds(),
        state.config.secure_cookies(),
    ))
}

/// Create an account with email and password, then sign it in
#[utoipa::path(
    post,
    path = "/api/auth/sign-up/email",
    tag = "Authentication",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = SignUpResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Untrusted origin"),
        (status = 422, description = "User already exists")
    )
)]
pub async fn sign_up_email(
    State(state): State<AppState>,
    ctx: RequestContext,
    client: ClientInfo,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> AppResult<(CookieJar, Json<SignUpResponse>)> {
    state
        .monitor
        .run(&ctx, async {
            let input = SignUpInput {
                email: payload.email,
                password: payload.password,
                name: payload.name,
                image: payload.image,
            };
            let data = state.auth_service.sign_up(input, client).await?;
            let jar = issue_session(&state, jar, &data)?;

            Ok((
                jar,
                Json(SignUpResponse {
                    token: data.session.token,
                    user: data.user,
                }),
            ))
        })
        .await
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/sign-in/email",
    tag = "Authentication",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Untrusted origin")
    )
)]
pub async fn sign_in_email(
    State(state): State<AppState>,
    ctx: RequestContext,
    client: ClientInfo,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> AppResult<(CookieJar, Json<SignInResponse>)> {
    state
        .monitor
        .run(&ctx, async {
            let input = SignInInput {
                email: payload.email,
                password: payload.password,
            };
            let data = state.auth_service.sign_in(input, client).await?;
            let jar = issue_session(&state, jar, &data)?;

            Ok((
                jar,
                Json(SignInResponse {
                    redirect: false,
                    token: data.session.token,
                    user: data.user,
                }),
            ))
        })
        .await
}

/// Current session, or `null` when signed out
#[utoipa::path(
    get,
    path = "/api/auth/get-session",
    tag = "Authentication",
    responses(
        (status = 200, description = "The session and its user, or null", body = SessionData)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Option<SessionData>>)> {
    state
        .monitor
        .run(&ctx, async {
            let Some(token) = cookies::session_token(&jar) else {
                return Ok((jar, Json(None)));
            };

            let cached = cookies::session_cache_value(&jar)
                .and_then(|value| state.session_cache.decode(&value))
                .filter(|data| data.session.token == token);
            if let Some(data) = cached {
                return Ok((jar, Json(Some(data))));
            }

            let secure = state.config.secure_cookies();
            let Some(lookup) = state.auth_service.get_session(&token).await? else {
                return Ok((cookies::clear_session_cookies(jar, secure), Json(None)));
            };

            let cache_value = state.session_cache.encode(&lookup.data)?;
            let mut jar = cookies::set_session_cache(
                jar,
                cache_value,
                state.session_cache.max_age_seconds(),
                secure,
            );
            if lookup.refreshed {
                jar = cookies::set_session_token(jar, &lookup.data.session, secure);
            }

            Ok((jar, Json(Some(lookup.data))))
        })
        .await
}

/// Revoke the current session and clear its cookies
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    tag = "Authentication",
    responses(
        (status = 200, description = "Signed out", body = SuccessResponse),
        (status = 403, description = "Untrusted origin")
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<SuccessResponse>)> {
    state
        .monitor
        .run(&ctx, async {
            if let Some(token) = cookies::session_token(&jar) {
                state.auth_service.sign_out(&token).await?;
            }

            let jar = cookies::clear_session_cookies(jar, state.config.secure_cookies());
            Ok((jar, Json(SuccessResponse::ok())))
        })
        .await
}
