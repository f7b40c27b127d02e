//! Service configuration for the upstream validation API
//!
//! The configuration is an immutable value built once at start-up and shared
//! with every operation handler through an `Arc`. A missing API key is not a
//! construction error: each operation reports it on its own (see
//! [`ErrorClassification::Configuration`](crate::http::ErrorClassification)).

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ABSTRACT_API_KEY";
/// Environment variable overriding the request timeout, in seconds
pub const TIMEOUT_ENV: &str = "ABSTRACT_API_TIMEOUT_SECS";
/// Environment variable overriding the email validation base URL
pub const EMAIL_VALIDATION_URL_ENV: &str = "ABSTRACT_EMAIL_VALIDATION_URL";
/// Environment variable overriding the phone validation base URL
pub const PHONE_VALIDATION_URL_ENV: &str = "ABSTRACT_PHONE_VALIDATION_URL";
/// Environment variable overriding the email reputation base URL
pub const EMAIL_REPUTATION_URL_ENV: &str = "ABSTRACT_EMAIL_REPUTATION_URL";

pub const DEFAULT_EMAIL_VALIDATION_URL: &str = "https://emailvalidation.abstractapi.com/v1/";
pub const DEFAULT_PHONE_VALIDATION_URL: &str = "https://phonevalidation.abstractapi.com/v1/";
pub const DEFAULT_EMAIL_REPUTATION_URL: &str = "https://emailreputation.abstractapi.com/v1/";

/// API key for the upstream service.
///
/// Never printed: `Debug` renders `ApiKey(***)` and there is no `Display`.
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Wrap a key, returning `None` for an empty or whitespace-only value.
    ///
    /// A non-blank key is kept byte for byte.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(value)))
    }

    /// Access the raw key, only for building the outbound request
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.expose().to_string()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Base URLs of the three upstream endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub email_validation: String,
    pub phone_validation: String,
    pub email_reputation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            email_validation: DEFAULT_EMAIL_VALIDATION_URL.to_string(),
            phone_validation: DEFAULT_PHONE_VALIDATION_URL.to_string(),
            email_reputation: DEFAULT_EMAIL_REPUTATION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point all three endpoints at one base, e.g. a local mock server.
    ///
    /// The paths mirror the production layout so that routing by path still works.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            email_validation: format!("{}/email/v1/", base),
            phone_validation: format!("{}/phone/v1/", base),
            email_reputation: format!("{}/reputation/v1/", base),
        }
    }

    /// Check that every endpoint is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("email_validation", &self.email_validation),
            ("phone_validation", &self.phone_validation),
            ("email_reputation", &self.email_reputation),
        ] {
            let parsed = url::Url::parse(value).map_err(|source| Error::InvalidUrl {
                endpoint: name.to_string(),
                source,
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::configuration(format!(
                    "{} must use http or https, got '{}'",
                    name,
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }
}

/// Timeout configuration for outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Time to establish a connection
    pub connect_timeout: Duration,
    /// Total time for the entire request, body included
    pub request_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    /// Override the request timeout, clamping the connect timeout down to it
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        if self.connect_timeout > timeout {
            self.connect_timeout = timeout;
        }
        self
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::configuration("connect timeout cannot be zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout cannot be zero"));
        }
        if self.request_timeout < self.connect_timeout {
            return Err(Error::configuration(
                "request timeout should be >= connect timeout",
            ));
        }
        Ok(())
    }
}

/// Immutable configuration threaded into every handler
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    api_key: Option<ApiKey>,
    endpoints: Endpoints,
    timeouts: TimeoutConfig,
    user_agent: String,
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Load from process environment.
    ///
    /// An absent key is kept as `None`; operations report it per call.
    pub fn from_env() -> Result<Self> {
        Self::builder().merge_env()?.build()
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        self.timeouts
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Builder for [`ServiceConfig`]
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    api_key: Option<ApiKey>,
    endpoints: Endpoints,
    timeouts: TimeoutConfig,
    user_agent: String,
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoints: Endpoints::default(),
            timeouts: TimeoutConfig::default(),
            user_agent: format!("abstractapi-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ServiceConfigBuilder {
    /// Set the API key; empty values leave the key unset
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn email_validation_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.email_validation = url.into();
        self
    }

    pub fn phone_validation_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.phone_validation = url.into();
        self
    }

    pub fn email_reputation_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.email_reputation = url.into();
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts = self.timeouts.with_request_timeout(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Apply environment overrides on top of the current values
    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(key) = env_var(API_KEY_ENV) {
            self = self.api_key(key);
        }
        if let Some(secs) = env_var(TIMEOUT_ENV) {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::configuration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_ENV, secs
                ))
            })?;
            self = self.request_timeout(Duration::from_secs(secs));
        }
        if let Some(url) = env_var(EMAIL_VALIDATION_URL_ENV) {
            self = self.email_validation_url(url);
        }
        if let Some(url) = env_var(PHONE_VALIDATION_URL_ENV) {
            self = self.phone_validation_url(url);
        }
        if let Some(url) = env_var(EMAIL_REPUTATION_URL_ENV) {
            self = self.email_reputation_url(url);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<ServiceConfig> {
        self.timeouts.validate()?;
        self.endpoints.validate()?;
        Ok(ServiceConfig {
            api_key: self.api_key,
            endpoints: self.endpoints,
            timeouts: self.timeouts,
            user_agent: self.user_agent,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
