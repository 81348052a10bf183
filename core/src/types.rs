//! Wire DTOs for the translations API.
//!
//! # Design
//! Blob contents are caller-defined trees, so they stay `serde_json::Value`
//! end to end. Only the envelope fields the client itself reads or writes
//! (`blobId`, the PUT metadata block) are typed. The mock-server crate reads
//! these same types, which keeps the two sides of the contract in one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Translated content for one language.
///
/// `blob_id` is a language query (a code or an English name); it is resolved
/// against the ISO 639 catalog before it is used in a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlob {
    pub data: Value,
    #[serde(rename = "blobId")]
    pub blob_id: String,
}

/// Language metadata sent alongside a blob on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub name: String,
    pub short_name: String,
    pub native_name: String,
}

/// Request body of `PUT /v1/services/{id}/blobs/{language}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutBlobBody {
    pub blob: Value,
    pub metadata: BlobMetadata,
}
