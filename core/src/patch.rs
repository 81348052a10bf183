//! RFC 6902 JSON Patch operations: shape validation and application.
//!
//! # Design
//! Caller-supplied patches arrive as arbitrary JSON. `validate` checks the
//! shape of every entry (operation kind and the fields that kind requires)
//! and turns the sequence into typed `PatchOperation`s; it never looks at
//! the target document. `apply` executes typed operations in order against
//! a document, using JSON Pointer paths with `~0`/`~1` escaping.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    pub fn remove(path: impl Into<String>) -> Self {
        PatchOperation::Remove { path: path.into() }
    }

    /// Operation kind as it appears in the `op` field.
    pub fn op(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, PatchOperation::Remove { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Patch sequence must be an array")]
    NotASequence,

    #[error("Operation {index} is not an object")]
    NotAnObject { index: usize },

    #[error("Operation {index}: `op` property is not one of the operations defined in RFC 6902")]
    InvalidOp { index: usize },

    #[error("Operation {index}: `path` property is not a string")]
    PathNotString { index: usize },

    #[error("Operation {index}: `path` property must start with \"/\"")]
    PathNotAbsolute { index: usize },

    #[error("Operation {index}: `from` property is required for `move` and `copy` operations")]
    MissingFrom { index: usize },

    #[error("Operation {index}: `value` property is required for `add`, `replace` and `test` operations")]
    MissingValue { index: usize },

    #[error("path `{0}` does not exist in the document")]
    PathNotFound(String),

    #[error("path `{0}` does not address a valid array index")]
    InvalidIndex(String),

    #[error("test operation failed at `{0}`")]
    TestFailed(String),

    #[error("cannot move `{from}` into its own child `{path}`")]
    MoveIntoChild { from: String, path: String },
}

/// Check that `patch` is a well-formed operation sequence and convert it.
pub fn validate(patch: &Value) -> Result<Vec<PatchOperation>, PatchError> {
    let entries = patch.as_array().ok_or(PatchError::NotASequence)?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_operation(index, entry))
        .collect()
}

fn validate_operation(index: usize, entry: &Value) -> Result<PatchOperation, PatchError> {
    let fields = entry.as_object().ok_or(PatchError::NotAnObject { index })?;

    let op = fields.get("op").and_then(Value::as_str);
    if !matches!(op, Some("add" | "remove" | "replace" | "move" | "copy" | "test")) {
        return Err(PatchError::InvalidOp { index });
    }

    let path = fields
        .get("path")
        .and_then(Value::as_str)
        .ok_or(PatchError::PathNotString { index })?
        .to_string();
    if !path.is_empty() && !path.starts_with('/') {
        return Err(PatchError::PathNotAbsolute { index });
    }

    let from = || {
        fields
            .get("from")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(PatchError::MissingFrom { index })
    };
    let value = || fields.get("value").cloned().ok_or(PatchError::MissingValue { index });

    Ok(match op {
        Some("add") => PatchOperation::Add { path, value: value()? },
        Some("remove") => PatchOperation::Remove { path },
        Some("replace") => PatchOperation::Replace { path, value: value()? },
        Some("move") => PatchOperation::Move { from: from()?, path },
        Some("copy") => PatchOperation::Copy { from: from()?, path },
        _ => PatchOperation::Test { path, value: value()? },
    })
}

/// Escape one reference token for use in a JSON Pointer.
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Apply `operations` to `doc` in order. Stops at the first failing
/// operation; earlier operations stay applied.
pub fn apply(doc: &mut Value, operations: &[PatchOperation]) -> Result<(), PatchError> {
    for operation in operations {
        apply_operation(doc, operation)?;
    }
    Ok(())
}

fn apply_operation(doc: &mut Value, operation: &PatchOperation) -> Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(drop),
        PatchOperation::Replace { path, value } => {
            let target = doc
                .pointer_mut(path)
                .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
            *target = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if from == path {
                return Ok(());
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = doc
                .pointer(from)
                .cloned()
                .ok_or_else(|| PatchError::PathNotFound(from.clone()))?;
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => match doc.pointer(path) {
            Some(found) if found == value => Ok(()),
            _ => Err(PatchError::TestFailed(path.clone())),
        },
    }
}

/// Split `path` into the parent pointer and the unescaped last token.
fn split_parent(path: &str) -> Result<(&str, String), PatchError> {
    path.rsplit_once('/')
        .map(|(parent, last)| (parent, unescape_pointer_segment(last)))
        .ok_or_else(|| PatchError::PathNotFound(path.to_string()))
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, token) = split_parent(path)?;
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => {
            map.insert(token, value);
            Ok(())
        }
        Some(Value::Array(items)) => {
            if token == "-" {
                items.push(value);
                return Ok(());
            }
            match parse_index(&token) {
                Some(index) if index <= items.len() => {
                    items.insert(index, value);
                    Ok(())
                }
                _ => Err(PatchError::InvalidIndex(path.to_string())),
            }
        }
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Ok(std::mem::take(doc));
    }
    let (parent, token) = split_parent(path)?;
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => map
            .shift_remove(&token)
            .ok_or_else(|| PatchError::PathNotFound(path.to_string())),
        Some(Value::Array(items)) => match parse_index(&token) {
            Some(index) if index < items.len() => Ok(items.remove(index)),
            _ => Err(PatchError::InvalidIndex(path.to_string())),
        },
        _ => Err(PatchError::PathNotFound(path.to_string())),
    }
}

/// Array indices are plain decimals without leading zeros.
fn parse_index(token: &str) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
