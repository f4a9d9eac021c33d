#![forbid(unsafe_code)]

use pb_storage::StoreError;
use serde::Serialize;
use serde_json::{Value, json};

/// One entry of the operation catalog handed to the UI collaborator.
#[derive(Clone, Debug, Serialize)]
pub struct OpDefinition {
    pub name: &'static str,
    pub about: &'static str,
}

pub fn ok_response(payload: Value) -> Value {
    json!({ "ok": true, "payload": payload })
}

pub fn error_response(code: &'static str, message: impl Into<String>) -> Value {
    json!({ "ok": false, "error": { "code": code, "message": message.into() } })
}

pub fn store_error_response(err: &StoreError) -> Value {
    error_response(error_code(err), err.to_string())
}

/// Wire code for each engine error. `concurrent_modification` is the only
/// transient one; everything else is terminal for the call and the client is
/// expected to refetch authoritative state rather than patch around it.
pub fn error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::NotFound => "not_found",
        StoreError::InvalidReference { .. } => "invalid_reference",
        StoreError::InvalidPosition { .. } => "invalid_position",
        StoreError::StageNotEmpty { .. } => "stage_not_empty",
        StoreError::ConcurrentModification => "concurrent_modification",
        StoreError::InvalidInput(_) => "validation_error",
        StoreError::Io(_) | StoreError::Sql(_) => "storage_error",
    }
}
