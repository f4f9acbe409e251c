use crate::errors::{
    domain::{self, DomainError, ErrorCode},
    ApiResult,
};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryErrorCode {
    UnresolvedItem,
    IntegrityCheckFailed,
    LockFailed,
    GuardClosed,
}

impl ErrorCode for HistoryErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::UnresolvedItem => "unresolved_item",
            Self::IntegrityCheckFailed => "integrity_check_failed",
            Self::LockFailed => "lock_failed",
            Self::GuardClosed => "guard_closed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryError {
    code: HistoryErrorCode,
    message: String,
}

impl HistoryError {
    pub fn new(code: HistoryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unresolved_item(path: &Path) -> Self {
        Self::new(
            HistoryErrorCode::UnresolvedItem,
            format!("Item path cannot be resolved: {:?}", path),
        )
    }

    pub fn missing_file_name(path: &Path) -> Self {
        Self::new(
            HistoryErrorCode::UnresolvedItem,
            format!("Item path is missing file name: {}", path.display()),
        )
    }

    pub fn item_gone(verb: &str) -> Self {
        Self::new(
            HistoryErrorCode::IntegrityCheckFailed,
            format!("Could not {verb}: item no longer exists"),
        )
    }

    pub fn code(&self) -> HistoryErrorCode {
        self.code
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HistoryError {}

impl DomainError for HistoryError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;

pub fn map_api_result<T>(result: HistoryResult<T>) -> ApiResult<T> {
    domain::map_api_result(result)
}
