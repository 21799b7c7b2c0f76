//! Trusted-origin check for state-changing auth requests.

use axum::{
    extract::{Request, State},
    http::{
        header::{ORIGIN, REFERER},
        Method,
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use crate::api::AppState;
use crate::errors::AppError;

/// Reject cross-site writes.
///
/// Safe methods pass through. Other requests carrying an `Origin` (or,
/// failing that, a `Referer`) must come from a trusted origin. Requests
/// with neither header are non-browser clients and are allowed.
pub async fn origin_check_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    if let Some(origin) = request_origin(&request) {
        if !state.config.is_trusted_origin(&origin) {
            tracing::warn!(origin = %origin, path = %request.uri().path(), "Rejected untrusted origin");
            return Err(AppError::InvalidOrigin);
        }
    }

    Ok(next.run(request).await)
}

fn request_origin(request: &Request) -> Option<String> {
    let headers = request.headers();

    if let Some(origin) = headers.get(ORIGIN).and_then(|h| h.to_str().ok()) {
        return Some(origin.to_string());
    }

    headers
        .get(REFERER)
        .and_then(|h| h.to_str().ok())
        .and_then(|referer| Url::parse(referer).ok())
        .map(|url| url.origin().ascii_serialization())
}
