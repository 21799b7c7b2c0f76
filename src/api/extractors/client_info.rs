//! Client address and user agent recorded on new sessions.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};

use crate::domain::ClientInfo;

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = forwarded_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}

/// First address in `X-Forwarded-For`, else `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(ip.to_string());
    }

    headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|ip| !ip.is_empty())
}
