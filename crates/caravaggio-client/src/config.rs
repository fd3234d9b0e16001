//! Binding configuration.
//!
//! A binding is described by an [`ApiProfile`]: the names of the environment
//! variables holding its domain and token, and the domain used when none is
//! configured. [`SessionConfig`] holds the values resolved from a profile.

use crate::error::{ClientError, ClientResult};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable names and defaults for one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiProfile {
    /// Variable holding the API token.
    pub token_var: &'static str,

    /// Variable holding the API base URL.
    pub domain_var: &'static str,

    /// Base URL used when neither an argument nor the variable is set.
    pub default_domain: &'static str,

    /// Prefix for the optional tuning variables (`<PREFIX>_TIMEOUT_SECS`, ...).
    pub prefix: &'static str,
}

impl ApiProfile {
    /// The Caravaggio service profile.
    pub const CARAVAGGIO: ApiProfile = ApiProfile {
        token_var: "CARAVAGGIO_TOKEN",
        domain_var: "CARAVAGGIO_DOMAIN",
        default_domain: "https://bgds.io",
        prefix: "CARAVAGGIO",
    };

    fn knob(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self::CARAVAGGIO
    }
}

/// Resolved configuration for a session.
///
/// The token is never serialized nor printed by `Debug`.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// API base URL.
    pub domain: String,

    /// API token, sent as `Authorization: Token <token>`.
    #[serde(skip_serializing)]
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retry behavior on throttled requests.
    #[serde(skip)]
    pub retry: RetryPolicy,
}

impl SessionConfig {
    /// Create a configuration from explicit values with default tuning.
    pub fn new(domain: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            token: token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    /// Resolve the configuration from arguments and the process environment.
    ///
    /// Environment variables (names come from the profile):
    /// - `<TOKEN_VAR>`: API token, required unless `token` is given
    /// - `<DOMAIN_VAR>`: API base URL (default: the profile's default domain)
    /// - `<PREFIX>_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `<PREFIX>_MAX_ATTEMPTS`: attempts on throttled requests (default: 12)
    /// - `<PREFIX>_RETRY_DELAY_SECS`: delay between those attempts (default: 5)
    pub fn from_env(
        profile: &ApiProfile,
        token: Option<String>,
        domain: Option<String>,
    ) -> ClientResult<Self> {
        Self::resolve(profile, token, domain, |name| std::env::var(name).ok())
    }

    /// Resolve the configuration using `lookup` in place of the environment.
    ///
    /// Explicit arguments win over variables; the domain falls back to the
    /// profile default. Fails if no token can be found.
    pub fn resolve<F>(
        profile: &ApiProfile,
        token: Option<String>,
        domain: Option<String>,
        lookup: F,
    ) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = token.or_else(|| lookup(profile.token_var)).ok_or_else(|| {
            ClientError::Configuration(format!(
                "No {0} was found in the environment. Please, make sure you have defined the {0} environment variable.",
                profile.token_var
            ))
        })?;

        let domain = domain
            .or_else(|| lookup(profile.domain_var))
            .unwrap_or_else(|| profile.default_domain.to_string());

        let defaults = RetryPolicy::default();

        Ok(Self {
            domain,
            token,
            timeout_secs: lookup(&profile.knob("TIMEOUT_SECS"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy {
                max_attempts: lookup(&profile.knob("MAX_ATTEMPTS"))
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_attempts),
                retry_delay: lookup(&profile.knob("RETRY_DELAY_SECS"))
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.retry_delay),
            },
        })
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a relative path to the domain.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.domain, path)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("domain", &self.domain)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Join a base URL and a relative path with exactly one `/`.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// URL of the OpenAPI schema published at `domain`.
pub(crate) fn schema_url(domain: &str) -> String {
    join_url(domain, "swagger/?format=openapi")
}
