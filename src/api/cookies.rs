//! Session cookie helpers.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::config::{SESSION_DATA_COOKIE, SESSION_TOKEN_COOKIE};
use crate::domain::{Session, SessionData};

/// Session token from the request cookies, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Signed session cache value from the request cookies, if any.
pub fn session_cache_value(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_DATA_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn build_cookie(name: &'static str, value: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Set the session token cookie, expiring together with the session.
pub fn set_session_token(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    jar.add(build_cookie(
        SESSION_TOKEN_COOKIE,
        session.token.clone(),
        session.remaining_seconds(Utc::now()),
        secure,
    ))
}

/// Set the signed session cache cookie.
pub fn set_session_cache(jar: CookieJar, value: String, max_age_seconds: i64, secure: bool) -> CookieJar {
    jar.add(build_cookie(SESSION_DATA_COOKIE, value, max_age_seconds, secure))
}

/// Set both cookies for a freshly opened session.
pub fn set_session_cookies(
    jar: CookieJar,
    data: &SessionData,
    cache_value: String,
    cache_max_age_seconds: i64,
    secure: bool,
) -> CookieJar {
    let jar = set_session_token(jar, &data.session, secure);
    set_session_cache(jar, cache_value, cache_max_age_seconds, secure)
}

/// Expire both session cookies.
pub fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(build_cookie(SESSION_TOKEN_COOKIE, String::new(), 0, secure))
        .add(build_cookie(SESSION_DATA_COOKIE, String::new(), 0, secure))
}
