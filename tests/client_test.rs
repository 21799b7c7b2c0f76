//! Client facade against a live server.

mod common;

use vendoo_auth::client::{AuthClient, ClientError, SignInParams, SignUpParams};

use common::{silent_mailer, spawn_app};

fn sign_up_params(email: &str) -> SignUpParams {
    SignUpParams {
        email: email.to_string(),
        password: "correct-horse-battery".to_string(),
        name: "Maria Silva".to_string(),
        image: None,
    }
}

#[tokio::test]
async fn test_session_lifecycle_is_published() {
    let app = spawn_app(silent_mailer()).await;
    let addr = app.serve().await;

    let client = AuthClient::new(&format!("http://{}", addr)).unwrap();
    let mut session = client.subscribe();

    let signed_up = client.sign_up(&sign_up_params("maria@example.com")).await.unwrap();
    assert_eq!(signed_up.user.email, "maria@example.com");

    assert!(session.has_changed().unwrap());
    let current = session.borrow_and_update().clone().unwrap();
    assert_eq!(current.user.email, "maria@example.com");
    assert_eq!(current.session.token, signed_up.token);
    assert_eq!(current.session.ip_address.as_deref(), Some("127.0.0.1"));

    client.sign_out().await.unwrap();
    assert!(client.session().is_none());
    assert!(client.get_session().await.unwrap().is_none());

    let signed_in = client
        .sign_in(&SignInParams {
            email: "maria@example.com".to_string(),
            password: "correct-horse-battery".to_string(),
        })
        .await
        .unwrap();
    assert!(!signed_in.redirect);
    assert_eq!(
        client.session().map(|s| s.user.email),
        Some("maria@example.com".to_string())
    );
}

#[tokio::test]
async fn test_api_errors_carry_status_and_code() {
    let app = spawn_app(silent_mailer()).await;
    let addr = app.serve().await;
    let client = AuthClient::new(&format!("http://{}", addr)).unwrap();

    let err = client
        .sign_in(&SignInParams {
            email: "nobody@example.com".to_string(),
            password: "whatever-password".to_string(),
        })
        .await
        .unwrap_err();

    match &err {
        ClientError::Api { status, code, .. } => {
            let status = *status;
            assert_eq!(status, 401);
            assert_eq!(code, "INVALID_EMAIL_OR_PASSWORD");
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert_eq!(err.code(), Some("INVALID_EMAIL_OR_PASSWORD"));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_is_an_api_error() {
    let app = spawn_app(silent_mailer()).await;
    let addr = app.serve().await;
    let client = AuthClient::new(&format!("http://{}", addr)).unwrap();

    client.sign_up(&sign_up_params("maria@example.com")).await.unwrap();
    let err = client
        .sign_up(&sign_up_params("maria@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("USER_ALREADY_EXISTS"));
}
