//! Credentials and the `Authorization` header.
//!
//! # Design
//! A `CredentialSource` is either a fixed string or an async supplier
//! (e.g. a token fetcher). The client resolves it once per outgoing request
//! and never caches the result. `AuthScheme` decides what the header value
//! looks like: `Bearer` adds the `Bearer ` marker unless the credential
//! already carries a scheme, `Raw` sends the credential verbatim.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::config::ConfigError;

type Supplier = Arc<dyn Fn() -> BoxFuture<'static, Option<String>> + Send + Sync>;

/// Where the client gets its credential from.
#[derive(Clone)]
pub enum CredentialSource {
    Static(String),
    Supplier(Supplier),
}

impl CredentialSource {
    pub fn fixed(credential: impl Into<String>) -> Self {
        CredentialSource::Static(credential.into())
    }

    /// Wrap an async zero-argument function. Returning `None` (or an empty
    /// string) sends the request without an `Authorization` header.
    pub fn supplier<F, Fut>(supplier: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        CredentialSource::Supplier(Arc::new(move || supplier().boxed()))
    }

    /// Current credential, `None` when there is nothing to attach.
    pub async fn resolve(&self) -> Option<String> {
        let credential = match self {
            CredentialSource::Static(value) => Some(value.clone()),
            CredentialSource::Supplier(supplier) => supplier().await,
        };
        credential.filter(|value| !value.is_empty())
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Static(_) => f.write_str("Static(<redacted>)"),
            CredentialSource::Supplier(_) => f.write_str("Supplier(..)"),
        }
    }
}

/// How a credential becomes an `Authorization` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// Prefix `Bearer ` unless a scheme is already present.
    #[default]
    Bearer,
    /// Attach the credential unmodified.
    Raw,
}

const KNOWN_SCHEMES: [&str; 2] = ["bearer ", "basic "];

impl AuthScheme {
    pub fn header_value(&self, credential: &str) -> String {
        match self {
            AuthScheme::Raw => credential.to_string(),
            AuthScheme::Bearer if has_scheme(credential) => credential.to_string(),
            AuthScheme::Bearer => format!("Bearer {credential}"),
        }
    }
}

fn has_scheme(credential: &str) -> bool {
    KNOWN_SCHEMES.iter().any(|scheme| {
        credential
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

impl FromStr for AuthScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(AuthScheme::Bearer),
            "raw" => Ok(AuthScheme::Raw),
            _ => Err(ConfigError::InvalidAuthScheme(s.to_string())),
        }
    }
}
