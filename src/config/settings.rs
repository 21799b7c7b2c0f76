//! Application settings loaded from environment variables.

use std::env;

use thiserror::Error;
use url::Url;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_MAIL_FROM, DEFAULT_RESEND_API_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, ENV_APP_URL, ENV_AUTH_SECRET, ENV_DATABASE_URL,
    ENV_ERROR_NOTIFICATION_EMAIL, ENV_MAIL_FROM, ENV_RESEND_API_KEY, ENV_RESEND_API_URL,
    ENV_SERVER_HOST, ENV_SERVER_PORT, ENV_TRUSTED_ORIGINS, RECOMMENDED_SECRET_LENGTH,
};

/// Startup configuration errors. Any of these aborts the process.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} is not a valid http(s) URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("{var} is not a valid port: {value}")]
    InvalidPort { var: &'static str, value: String },
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Public base URL of the application
    pub app_url: String,
    auth_secret: String,
    pub database_url: String,
    /// Recipient of unexpected-error notifications; `None` disables them
    pub error_notification_email: Option<String>,
    resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub mail_from: String,
    /// Origins allowed to issue state-changing requests (app origin first)
    pub trusted_origins: Vec<String>,
    pub server_host: String,
    pub server_port: u16,
    secure_cookies: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_url", &self.app_url)
            .field("auth_secret", &"[REDACTED]")
            .field("database_url", &"[REDACTED]")
            .field("error_notification_email", &self.error_notification_email)
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("resend_api_url", &self.resend_api_url)
            .field("mail_from", &self.mail_from)
            .field("trusted_origins", &self.trusted_origins)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    /// Fails if `APP_URL` or `AUTH_SECRET` is missing, or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let app_url = get(ENV_APP_URL).ok_or(ConfigError::Missing(ENV_APP_URL))?;
        let parsed_app_url = parse_http_url(ENV_APP_URL, &app_url)?;
        let secure_cookies = parsed_app_url.scheme() == "https";
        let app_origin = parsed_app_url.origin().ascii_serialization();

        let auth_secret = get(ENV_AUTH_SECRET).ok_or(ConfigError::Missing(ENV_AUTH_SECRET))?;
        if auth_secret.len() < RECOMMENDED_SECRET_LENGTH {
            tracing::warn!(
                "{} is shorter than {} characters; use a longer random value in production",
                ENV_AUTH_SECRET,
                RECOMMENDED_SECRET_LENGTH
            );
        }

        let mut trusted_origins = vec![app_origin];
        if let Some(extra) = get(ENV_TRUSTED_ORIGINS) {
            for origin in extra.split(',').map(str::trim).filter(|o| !o.is_empty()) {
                let origin = parse_http_url(ENV_TRUSTED_ORIGINS, origin)?
                    .origin()
                    .ascii_serialization();
                if !trusted_origins.contains(&origin) {
                    trusted_origins.push(origin);
                }
            }
        }

        let server_port = match get(ENV_SERVER_PORT) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                var: ENV_SERVER_PORT,
                value,
            })?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Self {
            app_url,
            auth_secret,
            database_url: get(ENV_DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            error_notification_email: get(ENV_ERROR_NOTIFICATION_EMAIL),
            resend_api_key: get(ENV_RESEND_API_KEY),
            resend_api_url: get(ENV_RESEND_API_URL)
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
            mail_from: get(ENV_MAIL_FROM).unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            trusted_origins,
            server_host: get(ENV_SERVER_HOST).unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port,
            secure_cookies,
        })
    }

    /// Get secret bytes for signing the session cache cookie.
    pub fn auth_secret_bytes(&self) -> &[u8] {
        self.auth_secret.as_bytes()
    }

    /// Mail provider API key, if configured.
    pub fn resend_api_key(&self) -> Option<&str> {
        self.resend_api_key.as_deref()
    }

    /// Whether session cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Check an `Origin` header value against the trusted origins.
    pub fn is_trusted_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.trusted_origins.iter().any(|o| o == origin)
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an absolute http(s) URL.
fn parse_http_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("APP_URL", "http://localhost:3000"),
        ("AUTH_SECRET", "a-test-secret-that-is-long-enough-123"),
    ];

    #[test]
    fn test_loads_required_values_and_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.app_url, "http://localhost:3000");
        assert_eq!(config.trusted_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.resend_api_url, DEFAULT_RESEND_API_URL);
        assert_eq!(config.mail_from, DEFAULT_MAIL_FROM);
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert!(config.error_notification_email.is_none());
        assert!(config.resend_api_key().is_none());
        assert!(!config.secure_cookies());
    }

    #[test]
    fn test_missing_app_url_fails() {
        let result = Config::from_lookup(lookup(&[("AUTH_SECRET", "secret")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("APP_URL"));
    }

    #[test]
    fn test_missing_secret_fails() {
        let result = Config::from_lookup(lookup(&[("APP_URL", "http://localhost:3000")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("AUTH_SECRET"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let result = Config::from_lookup(lookup(&[
            ("APP_URL", "http://localhost:3000"),
            ("AUTH_SECRET", "   "),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("AUTH_SECRET"));
    }

    #[test]
    fn test_invalid_app_url_fails() {
        let result = Config::from_lookup(lookup(&[
            ("APP_URL", "not a url"),
            ("AUTH_SECRET", "secret"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { var: "APP_URL", .. })));

        let result = Config::from_lookup(lookup(&[
            ("APP_URL", "ftp://example.com"),
            ("AUTH_SECRET", "secret"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { var: "APP_URL", .. })));
    }

    #[test]
    fn test_optional_values_and_trusted_origins() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("APP_URL", "https://app.example.com/dashboard"),
            ("ERROR_NOTIFICATION_EMAIL", "ops@example.com"),
            ("RESEND_API_KEY", "re_123"),
            ("TRUSTED_ORIGINS", "https://admin.example.com, https://app.example.com"),
            ("SERVER_PORT", "8080"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(
            config.trusted_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
        assert!(config.is_trusted_origin("https://admin.example.com"));
        assert!(!config.is_trusted_origin("https://evil.example.com"));
        assert_eq!(config.error_notification_email.as_deref(), Some("ops@example.com"));
        assert_eq!(config.resend_api_key(), Some("re_123"));
        assert_eq!(config.server_port, 8080);
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_secure_cookies_ignores_scheme_case() {
        let config = Config::from_lookup(lookup(&[
            ("APP_URL", "HTTPS://App.Example.com"),
            ("AUTH_SECRET", "a-test-secret-that-is-long-enough-123"),
        ]))
        .unwrap();

        assert!(config.secure_cookies());
        assert_eq!(config.trusted_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        let result = Config::from_lookup(lookup(&pairs));
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RESEND_API_KEY", "re_secret_key"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("a-test-secret"));
        assert!(!debug.contains("re_secret_key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
