//! Error monitor - wraps request handlers with failure notification.
//!
//! Client errors pass through untouched. Every other failure triggers one
//! best-effort email to the operator; fatal errors then surface as raised,
//! and the rest are replaced by the generic [`AppError::Unexpected`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::errors::{AppError, AppResult, ErrorClass};
use crate::infra::{EmailMessage, EmailSender};
use crate::utils::templates::{error_notification_html, error_notification_subject};

/// Request details included in notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Classifies handler failures and notifies the operator about unexpected ones
pub struct ErrorMonitor {
    mailer: Arc<dyn EmailSender>,
    recipient: Option<String>,
}

impl ErrorMonitor {
    /// Create a monitor. `recipient = None` disables notifications.
    pub fn new(mailer: Arc<dyn EmailSender>, recipient: Option<String>) -> Self {
        Self { mailer, recipient }
    }

    /// Run a handler future under the monitor.
    ///
    /// Successful results are returned unchanged with no side effects.
    pub async fn run<T, F>(&self, ctx: &RequestContext, handler: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match handler.await {
            Ok(value) => Ok(value),
            Err(err) => Err(self.intercept(ctx, err).await),
        }
    }

    /// Apply the notification policy to a failure and return the error to raise.
    pub async fn intercept(&self, ctx: &RequestContext, err: AppError) -> AppError {
        match err.class() {
            ErrorClass::Client => err,
            ErrorClass::Fatal => {
                self.notify(ctx, &err).await;
                err
            }
            ErrorClass::Server => {
                self.notify(ctx, &err).await;
                AppError::Unexpected
            }
        }
    }

    /// Send the notification email. Never fails.
    async fn notify(&self, ctx: &RequestContext, err: &AppError) {
        tracing::error!(
            method = %ctx.method,
            path = %ctx.path,
            error = %err,
            "Unhandled error in request handler"
        );

        let Some(recipient) = self.recipient.as_deref() else {
            tracing::warn!("Error notification email not configured, skipping notification");
            return;
        };

        let detail = err.detail();
        let message = EmailMessage::new(
            recipient,
            error_notification_subject(&ctx.method, &ctx.path),
            error_notification_html(
                &ctx.method,
                &ctx.path,
                Utc::now(),
                &err.to_string(),
                Some(&detail),
            ),
        );

        if let Err(mail_err) = self.mailer.send(message).await {
            tracing::error!("Failed to send error notification email: {}", mail_err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UNEXPECTED_ERROR_MESSAGE;
    use crate::infra::{MailError, MockEmailSender};

    fn ctx() -> RequestContext {
        RequestContext::new("POST", "/api/auth/sign-in/email")
    }

    fn monitor(mailer: MockEmailSender) -> ErrorMonitor {
        ErrorMonitor::new(Arc::new(mailer), Some("ops@example.com".to_string()))
    }

    #[tokio::test]
    async fn test_success_passes_through_without_notification() {
        let mut mailer = MockEmailSender::new();
        mailer.expect_send().never();

        let result = monitor(mailer).run(&ctx(), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_client_error_is_returned_unchanged_without_notification() {
        let mut mailer = MockEmailSender::new();
        mailer.expect_send().never();

        let result: AppResult<()> = monitor(mailer)
            .run(&ctx(), async { Err(AppError::InvalidCredentials) })
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_server_error_is_notified_once_and_redacted() {
        let mut mailer = MockEmailSender::new();
        mailer
            .expect_send()
            .withf(|m| {
                m.to == "ops@example.com"
                    && m.subject == "[Error] POST /api/auth/sign-in/email"
                    && m.html.contains("db exploded")
            })
            .times(1)
            .returning(|_| Ok(()));

        let result: AppResult<()> = monitor(mailer)
            .run(&ctx(), async { Err(AppError::internal("db exploded")) })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Unexpected));
        assert_eq!(err.to_string(), UNEXPECTED_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_fatal_error_is_notified_and_kept() {
        let mut mailer = MockEmailSender::new();
        mailer.expect_send().times(1).returning(|_| Ok(()));

        let result: AppResult<()> = monitor(mailer)
            .run(&ctx(), async { Err(AppError::Fatal("ledger mismatch".into())) })
            .await;

        match result {
            Err(AppError::Fatal(msg)) => assert_eq!(msg, "ledger mismatch"),
            other => panic!("expected fatal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_mask_original_error() {
        let mut mailer = MockEmailSender::new();
        mailer.expect_send().times(1).returning(|_| {
            Err(MailError::Provider {
                status: 503,
                body: "unavailable".into(),
            })
        });

        let result: AppResult<()> = monitor(mailer)
            .run(&ctx(), async { Err(AppError::bug()) })
            .await;
        assert!(matches!(result, Err(AppError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_missing_recipient_skips_mail() {
        let mut mailer = MockEmailSender::new();
        mailer.expect_send().never();

        let monitor = ErrorMonitor::new(Arc::new(mailer), None);
        let result: AppResult<()> = monitor
            .run(&ctx(), async { Err(AppError::internal("boom")) })
            .await;
        assert!(matches!(result, Err(AppError::Unexpected)));
    }
}
