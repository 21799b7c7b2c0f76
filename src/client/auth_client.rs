//! Auth endpoint client.

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use url::Url;

use crate::api::handlers::auth_handler::{SignInResponse, SignUpResponse};
use crate::config::AUTH_BASE_PATH;
use crate::domain::SessionData;
use crate::types::SuccessResponse;

/// Client-side failures
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// API error code, when the server answered with one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Email sign-up parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpParams {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Email sign-in parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInParams {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// HTTP client for the auth endpoints.
///
/// Cookies set by the server are kept between calls, so a successful
/// sign-in authenticates every later request made through this client.
pub struct AuthClient {
    http: Client,
    base_url: Url,
    session: watch::Sender<Option<SessionData>>,
}

impl AuthClient {
    /// Create a client for the application at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        let (session, _) = watch::channel(None);

        // Relative joins replace the last path segment unless it ends with '/'.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionData>> {
        self.session.subscribe()
    }

    /// Last known session.
    pub fn session(&self) -> Option<SessionData> {
        self.session.borrow().clone()
    }

    /// Create an account; the client is signed in on success.
    pub async fn sign_up(&self, params: &SignUpParams) -> Result<SignUpResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("sign-up/email")?)
            .json(params)
            .send()
            .await?;

        let body = parse(response).await?;
        self.get_session().await?;
        Ok(body)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, params: &SignInParams) -> Result<SignInResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("sign-in/email")?)
            .json(params)
            .send()
            .await?;

        let body = parse(response).await?;
        self.get_session().await?;
        Ok(body)
    }

    /// Sign out and forget the session.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint("sign-out")?)
            .send()
            .await?;

        let _: SuccessResponse = parse(response).await?;
        self.session.send_replace(None);
        Ok(())
    }

    /// Fetch the current session and publish it to subscribers.
    pub async fn get_session(&self) -> Result<Option<SessionData>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("get-session")?)
            .send()
            .await?;

        let data: Option<SessionData> = parse(response).await?;
        self.session.send_replace(data.clone());
        Ok(data)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = AUTH_BASE_PATH.trim_start_matches('/');
        Ok(self.base_url.join(&format!("{}/{}", base, path))?)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => ("UNKNOWN".to_string(), text),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_under_auth_base_path() {
        let client = AuthClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.endpoint("get-session").unwrap().as_str(),
            "http://localhost:3000/api/auth/get-session"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = AuthClient::new("https://host/app").unwrap();
        assert_eq!(
            client.endpoint("sign-in/email").unwrap().as_str(),
            "https://host/app/api/auth/sign-in/email"
        );

        let client = AuthClient::new("https://host/app/").unwrap();
        assert_eq!(
            client.endpoint("sign-out").unwrap().as_str(),
            "https://host/app/api/auth/sign-out"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            AuthClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_new_client_has_no_session() {
        let client = AuthClient::new("http://localhost:3000").unwrap();
        assert!(client.session().is_none());
        assert!(client.subscribe().borrow().is_none());
    }
}
