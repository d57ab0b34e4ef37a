//! Client configuration and credential resolution.
//!
//! Environment variables are only consulted when the caller asks for it with
//! [`ClientConfig::with_env_fallback`]; building a [`crate::Client`] never
//! reads the process environment on its own.

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.pingdom.com/api/3.1";
/// Environment variable holding a fallback API token.
pub const API_TOKEN_ENV: &str = "PINGDOM_API_TOKEN";
/// Environment variable holding a fallback API key.
pub const API_KEY_ENV: &str = "PINGDOM_API_KEY";

/// Settings used to build a [`crate::Client`].
///
/// At least one of `api_token` / `api_key` must be non-empty. When both are
/// set the API key is the credential sent on every request.
///
/// Custom `Debug` implementation redacts both credentials.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub api_token: Option<String>,
    pub api_key: Option<String>,
    /// Defaults to [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// Transport to send requests through. Timeouts, proxies and pooling are
    /// configured here; a default `reqwest::Client` is used when absent.
    pub http_client: Option<reqwest::Client>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ClientConfig")
            .field("api_token", &redact(&self.api_token))
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

impl ClientConfig {
    pub fn with_api_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http_client = Some(http);
        self
    }

    /// Fill empty credentials from `PINGDOM_API_TOKEN` / `PINGDOM_API_KEY`.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fill empty credentials from `lookup`, keyed by the environment
    /// variable names. Explicit non-empty fields are never replaced.
    pub fn with_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if non_empty(self.api_token.as_deref()).is_none() {
            self.api_token = lookup(API_TOKEN_ENV).filter(|s| !s.is_empty());
        }
        if non_empty(self.api_key.as_deref()).is_none() {
            self.api_key = lookup(API_KEY_ENV).filter(|s| !s.is_empty());
        }
        self
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
