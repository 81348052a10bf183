//! Client configuration.
//!
//! Static settings only: where the service lives, how credentials are
//! turned into an `Authorization` header, and the transport timeout.
//! Credentials themselves are not configuration; see `CredentialSource`.

use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthScheme;

/// Production endpoint of the translations service.
pub const DEFAULT_BASE_URL: &str = "https://api.translations.cimpress.io";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown auth scheme `{0}` (expected `bearer` or `raw`)")]
    InvalidAuthScheme(String),

    #[error("TRANSLATIONS_TIMEOUT_SECS must be a whole number of seconds, got `{0}`")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_scheme: AuthScheme,
    /// Per-request timeout handed to the transport. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_scheme: AuthScheme::default(),
            timeout: None,
        }
    }

    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `TRANSLATIONS_API_URL`, `TRANSLATIONS_AUTH_SCHEME` and
    /// `TRANSLATIONS_TIMEOUT_SECS`. Unset or empty variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match var("TRANSLATIONS_API_URL") {
            Some(url) => Self::new(url.trim()),
            None => Self::default(),
        };
        if let Some(scheme) = var("TRANSLATIONS_AUTH_SCHEME") {
            config.auth_scheme = scheme.parse()?;
        }
        if let Some(secs) = var("TRANSLATIONS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(secs.clone()))?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_production() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn env_overrides_every_field() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TRANSLATIONS_API_URL", "http://localhost:3000/"),
            ("TRANSLATIONS_AUTH_SCHEME", "raw"),
            ("TRANSLATIONS_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.auth_scheme, AuthScheme::Raw);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn empty_values_are_ignored() {
        let config =
            ClientConfig::from_lookup(lookup(&[("TRANSLATIONS_API_URL", "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("TRANSLATIONS_AUTH_SCHEME", "digest")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidAuthScheme("digest".into()));

        let err = ClientConfig::from_lookup(lookup(&[("TRANSLATIONS_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("soon".into()));
    }

    #[test]
    fn builder_setters_chain() {
        let config = ClientConfig::new("http://example.test")
            .with_auth_scheme(AuthScheme::Raw)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.auth_scheme, AuthScheme::Raw);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
    }
}
