//! Client core for the translations service.
//!
//! # Overview
//! Lists services, reads and writes per-language content blobs, and patches a
//! service's content structure. Three pieces carry the logic:
//!
//! - `language`: resolves a 2-letter code, 3-letter code or English name to
//!   an ISO 639-2 code and its catalog record.
//! - `diff`: computes the removal-only patch that reconciles a remote content
//!   tree with a local one.
//! - `client`: validates arguments, builds requests, and maps every failure
//!   onto the five kinds of `ErrorKind`.
//!
//! # Design
//! - `TranslationsClient` holds only static configuration (base URL, auth
//!   scheme, credential source, transport) and no per-call state.
//! - Each operation is a pure `build_*` step plus `parse_response`, so hosts
//!   can run the I/O themselves; the async methods do it through a
//!   `Transport` (`ReqwestTransport` by default).
//! - No retries anywhere: wrap whole operation calls if you need them.

pub mod auth;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod http;
pub mod language;
pub mod patch;
pub mod transport;
pub mod types;

pub use auth::{AuthScheme, CredentialSource};
pub use client::TranslationsClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use diff::{diff, diff_removals};
pub use error::{ClientError, ErrorKind, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use language::{resolve_code, resolve_record, LanguageCatalog, LanguageRecord};
pub use patch::{PatchError, PatchOperation};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{BlobMetadata, ContentBlob, PutBlobBody};
