use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;

use super::error::HistoryError;
use crate::errors::{domain::DomainError, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Redo: replay the recorded action.
    Forward,
    /// Undo: apply the inverse of the recorded action.
    Backward,
}

impl Direction {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Forward => "redo",
            Self::Backward => "undo",
        }
    }
}

/// Terminal outcome of one undo or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnResult {
    Success,
    Cancelled,
    InProgress,
    IntegrityCheckFailed,
}

impl ReturnResult {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// The non-fatal notice a host shows for this outcome. Cancelled and
    /// in-progress outcomes stay silent.
    pub fn notice(self, direction: Direction) -> Option<ApiError> {
        match self {
            Self::IntegrityCheckFailed => {
                Some(HistoryError::item_gone(direction.verb()).to_api_error())
            }
            _ => None,
        }
    }
}

/// Status codes reported by the low-level executor while it works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileSystemStatusCode {
    Success,
    Generic,
    Unauthorized,
    NotFound,
    InUse,
    NameTooLong,
    AlreadyExists,
    NotAFolder,
    NotAFile,
    InProgress,
    Cancelled,
}

impl FileSystemStatusCode {
    pub fn to_status(self) -> ReturnResult {
        match self {
            Self::Success => ReturnResult::Success,
            Self::InProgress => ReturnResult::InProgress,
            Self::Cancelled => ReturnResult::Cancelled,
            Self::Generic
            | Self::Unauthorized
            | Self::NotFound
            | Self::InUse
            | Self::NameTooLong
            | Self::AlreadyExists
            | Self::NotAFolder
            | Self::NotAFile => ReturnResult::IntegrityCheckFailed,
        }
    }
}

/// Reduces the stream of status updates from one executor call to a single
/// result. Starts at `InProgress`; a failure sticks once reported.
#[derive(Debug)]
pub struct StatusReporter {
    state: Mutex<ReturnResult>,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReturnResult::InProgress),
        }
    }

    pub fn report(&self, code: FileSystemStatusCode) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state == ReturnResult::IntegrityCheckFailed {
            return;
        }
        debug!(status = ?code, "executor status");
        *state = code.to_status();
    }

    pub fn result(&self) -> ReturnResult {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Result once the executor call has returned. An executor that never
    /// reported anything but a pending status completed normally.
    pub fn finish(&self) -> ReturnResult {
        match self.result() {
            ReturnResult::InProgress => ReturnResult::Success,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteConfirmationPolicy {
    Always,
    PermanentOnly,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NameCollisionOption {
    GenerateUniqueName,
    ReplaceExisting,
    FailIfExists,
}
