//! Error taxonomy for the translations client.
//!
//! # Design
//! Callers only ever see one of five error kinds. Transport failures are
//! mapped by status code (`404` → `ENOTFOUND`, `401`/`403` → `ENOACCESS`,
//! anything else → `EGENERIC`), and local validation failures (`ENOLANG`,
//! `EBADREQUEST`) are raised before any request leaves the process.
//!
//! Each kind has a stable name and a default message. A `ClientError` may
//! override the message with a detail string at construction time, so
//! callers should branch on `kind()`, never on message text.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// The closed set of error kinds surfaced by `TranslationsClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unclassified transport or service failure.
    Generic,

    /// The service or the requested language resource does not exist.
    NotFound,

    /// The caller is not authenticated or not authorized.
    NoAccess,

    /// The language query did not resolve against the ISO 639 catalog.
    NoLanguage,

    /// A structure patch failed shape validation before transmission.
    BadRequest,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Generic,
        ErrorKind::NotFound,
        ErrorKind::NoAccess,
        ErrorKind::NoLanguage,
        ErrorKind::BadRequest,
    ];

    /// Stable name of this kind, e.g. `"ENOTFOUND"`.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "EGENERIC",
            ErrorKind::NotFound => "ENOTFOUND",
            ErrorKind::NoAccess => "ENOACCESS",
            ErrorKind::NoLanguage => "ENOLANG",
            ErrorKind::BadRequest => "EBADREQUEST",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "An unspecified error has occured.",
            ErrorKind::NotFound => "The service does not exist or does not support this language.",
            ErrorKind::NoAccess => "You are not authenticated or authorized to read this information.",
            ErrorKind::NoLanguage => "The specified language could not be found in the ISO 639-2 database.",
            ErrorKind::BadRequest => "The structure patch is not a valid JSON patch.",
        }
    }

    /// Look a kind up by its stable name.
    pub fn from_name(name: &str) -> Option<ErrorKind> {
        ErrorKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by every `TranslationsClient` operation.
///
/// Immutable once built: the message is either the kind's default or the
/// detail supplied to `with_message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl ClientError {
    /// Build an error carrying the default message for `kind`.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Cow::Borrowed(kind.default_message()),
        }
    }

    /// Build an error whose message is replaced by `detail`.
    pub fn with_message(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: Cow::Owned(detail.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ErrorKind> for ClientError {
    fn from(kind: ErrorKind) -> Self {
        ClientError::new(kind)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let names: Vec<_> = ErrorKind::ALL.iter().map(ErrorKind::name).collect();
        assert_eq!(names, ["EGENERIC", "ENOTFOUND", "ENOACCESS", "ENOLANG", "EBADREQUEST"]);
    }

    #[test]
    fn new_uses_default_message() {
        let err = ClientError::new(ErrorKind::NoLanguage);
        assert_eq!(err.name(), "ENOLANG");
        assert_eq!(
            err.message(),
            "The specified language could not be found in the ISO 639-2 database."
        );
    }

    #[test]
    fn with_message_overrides_text_but_not_kind() {
        let err = ClientError::with_message(ErrorKind::BadRequest, "Operation 0 is not an object");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), "Operation 0 is not an object");
        assert_eq!(err.to_string(), "EBADREQUEST: Operation 0 is not an object");
    }

    #[test]
    fn from_name_round_trips_every_kind() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("EUNKNOWN"), None);
    }
}
