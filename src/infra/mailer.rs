//! Transactional email delivery through the Resend HTTP API.
//!
//! Without an API key the mailer runs in a degraded mode: every send is
//! logged and skipped, and reported as successful.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::{Config, MAIL_REQUEST_TIMEOUT_SECONDS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Failed to build mail HTTP client: {0}")]
    ClientBuild(String),

    #[error("Mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected the message ({status}): {body}")]
    Provider { status: u16, body: String },
}

/// A single HTML email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Email delivery abstraction
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one message. Provider failures are returned, never retried.
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// Request body accepted by `POST /emails`
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Resend-backed [`EmailSender`]
pub struct ResendMailer {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    from: String,
}

impl ResendMailer {
    /// Create a mailer. `api_key = None` disables delivery.
    pub fn new(
        api_key: Option<String>,
        api_url: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(MAIL_REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| MailError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            from: from.into(),
        })
    }

    /// Create a mailer from application configuration.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        Self::new(
            config.resend_api_key().map(str::to_owned),
            config.resend_api_url.clone(),
            config.mail_from.clone(),
        )
    }

    /// Whether messages will actually be delivered.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(
                to = %message.to,
                subject = %message.subject,
                "Mail provider API key not configured, skipping email"
            );
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(&SendEmailRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
