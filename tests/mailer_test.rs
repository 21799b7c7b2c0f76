//! Resend mailer against a mock provider.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendoo_auth::infra::{EmailMessage, EmailSender, MailError, ResendMailer};

const FROM: &str = "Vendoo Sistema <onboarding@resend.dev>";

fn message() -> EmailMessage {
    EmailMessage::new("ops@example.com", "[Error] GET /health", "<p>boom</p>")
}

#[tokio::test]
async fn test_send_posts_documented_body_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_key"))
        .and(body_json(json!({
            "from": FROM,
            "to": "ops@example.com",
            "subject": "[Error] GET /health",
            "html": "<p>boom</p>",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_123" })))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = ResendMailer::new(Some("re_test_key".to_string()), server.uri(), FROM).unwrap();

    assert!(mailer.is_configured());
    mailer.send(message()).await.unwrap();
}

#[tokio::test]
async fn test_provider_rejection_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid `to` field"))
        .mount(&server)
        .await;

    let mailer = ResendMailer::new(Some("re_test_key".to_string()), server.uri(), FROM).unwrap();

    match mailer.send(message()).await {
        Err(MailError::Provider { status, body }) => {
            assert_eq!(status, 422);
            assert!(body.contains("invalid"));
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_without_api_key_nothing_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mailer = ResendMailer::new(None, server.uri(), FROM).unwrap();

    assert!(!mailer.is_configured());
    assert!(mailer.send(message()).await.is_ok());
}

#[tokio::test]
async fn test_trailing_slash_in_api_url_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = ResendMailer::new(
        Some("re_test_key".to_string()),
        format!("{}/", server.uri()),
        FROM,
    )
    .unwrap();

    mailer.send(message()).await.unwrap();
}
