//! Shared helpers for integration tests.
//!
//! Each test gets its own SQLite database in a temporary directory with
//! migrations applied, and a router wired exactly as in production apart
//! from the injected mailer.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use vendoo_auth::api::{create_router, AppState};
use vendoo_auth::config::Config;
use vendoo_auth::infra::{Database, EmailSender, MockEmailSender};

pub const APP_URL: &str = "http://localhost:3000";
pub const OPS_EMAIL: &str = "ops@example.com";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// Response pieces most assertions need
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` pairs of every non-empty `set-cookie`, joined for a `cookie` header
    pub fn cookies(&self) -> String {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// A single cookie pair, e.g. `auth.session_token=...`
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies()
            .split("; ")
            .find(|pair| pair.starts_with(&format!("{}=", name)))
            .map(str::to_owned)
    }

    /// Raw `set-cookie` header for `name`, including attributes
    pub fn set_cookie_header(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", name)))
            .map(str::to_owned)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "APP_URL" => Some(APP_URL.to_string()),
        "AUTH_SECRET" => Some("integration-test-secret-0123456789abcdef".to_string()),
        "ERROR_NOTIFICATION_EMAIL" => Some(OPS_EMAIL.to_string()),
        "TRUSTED_ORIGINS" => Some("http://admin.localhost:4000".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// A mailer that fails the test if anything is sent
pub fn silent_mailer() -> MockEmailSender {
    let mut mailer = MockEmailSender::new();
    mailer.expect_send().never();
    mailer
}

pub async fn spawn_app(mailer: impl EmailSender + 'static) -> TestApp {
    let dir = TempDir::new().expect("create temp dir");
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("auth.db").display());
    let database = Arc::new(
        Database::connect(&database_url)
            .await
            .expect("connect and migrate test database"),
    );

    let state = AppState::with_mailer(database, test_config(), Arc::new(mailer));

    TestApp {
        router: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> TestResponse {
        self.post_json(
            "/api/auth/sign-up/email",
            serde_json::json!({ "email": email, "password": password, "name": name }),
            None,
        )
        .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/sign-in/email",
            serde_json::json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Serve the router on an ephemeral local port.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("test server");
        });

        addr
    }
}
