use serde::Serialize;

pub mod domain;

/// Error shape handed across the host boundary: a stable code plus a
/// human-readable message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;
