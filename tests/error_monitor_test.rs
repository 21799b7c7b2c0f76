//! Error notification through the HTTP surface.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use sea_orm::{ConnectionTrait, Statement};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendoo_auth::errors::{AppError, UNEXPECTED_ERROR_MESSAGE};
use vendoo_auth::infra::{MockEmailSender, ResendMailer};
use vendoo_auth::services::{ErrorMonitor, RequestContext};

use common::{spawn_app, OPS_EMAIL};

const EMAIL: &str = "maria@example.com";
const PASSWORD: &str = "correct-horse-battery";

async fn drop_sessions_table(app: &common::TestApp) {
    let conn = app.state.database.connection();
    conn.execute(Statement::from_string(
        conn.get_database_backend(),
        "DROP TABLE sessions".to_string(),
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn test_store_failure_is_notified_once_and_redacted() {
    let mut mailer = MockEmailSender::new();
    mailer
        .expect_send()
        .withf(|m| {
            m.to == OPS_EMAIL
                && m.subject == "[Error] POST /api/auth/sign-in/email"
                && m.html.contains("<strong>Route:</strong> POST /api/auth/sign-in/email")
        })
        .times(1)
        .returning(|_| Ok(()));

    let app = spawn_app(mailer).await;
    app.sign_up(EMAIL, PASSWORD, "Maria").await;
    drop_sessions_table(&app).await;

    let response = app.sign_in(EMAIL, PASSWORD).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(response.body["error"]["message"], UNEXPECTED_ERROR_MESSAGE);
    assert!(response.cookie("auth.session_token").is_none());
}

#[tokio::test]
async fn test_client_errors_are_never_notified() {
    let mut mailer = MockEmailSender::new();
    mailer.expect_send().never();

    let app = spawn_app(mailer).await;
    app.sign_up(EMAIL, PASSWORD, "Maria").await;

    assert_eq!(
        app.sign_up(EMAIL, PASSWORD, "Maria").await.status,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        app.sign_in(EMAIL, "wrong-password").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.post_json("/api/auth/sign-up/email", json!({ "email": EMAIL }), None)
            .await
            .status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_failed_notification_keeps_generic_response() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider down"))
        .expect(1)
        .mount(&provider)
        .await;

    let mailer = ResendMailer::new(
        Some("re_test_key".to_string()),
        provider.uri(),
        "Vendoo <alerts@example.com>",
    )
    .unwrap();

    let app = spawn_app(mailer).await;
    app.sign_up(EMAIL, PASSWORD, "Maria").await;
    drop_sessions_table(&app).await;

    let response = app.sign_in(EMAIL, PASSWORD).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"]["message"], UNEXPECTED_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_fatal_error_surfaces_unchanged_after_notification() {
    let mut mailer = MockEmailSender::new();
    mailer
        .expect_send()
        .withf(|m| m.subject == "[Error] POST /api/orders" && m.html.contains("stock ledger out of sync"))
        .times(1)
        .returning(|_| Ok(()));

    let monitor = ErrorMonitor::new(Arc::new(mailer), Some(OPS_EMAIL.to_string()));
    let ctx = RequestContext::new("POST", "/api/orders");

    let result: Result<(), AppError> = monitor
        .run(&ctx, async {
            Err(AppError::Fatal("stock ledger out of sync".to_string()))
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.to_string(), "stock ledger out of sync");
}
