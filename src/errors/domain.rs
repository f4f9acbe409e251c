use super::{ApiError, ApiResult};
use std::io::ErrorKind;

pub trait ErrorCode {
    #[allow(clippy::wrong_self_convention)]
    fn as_code_str(self) -> &'static str;
}

pub trait DomainError: std::error::Error {
    fn code_str(&self) -> &'static str;
    fn message(&self) -> &str;

    fn to_api_error(&self) -> ApiError {
        ApiError {
            code: self.code_str().to_owned(),
            message: self.message().to_owned(),
        }
    }
}

pub fn map_api_result<T, E>(result: Result<T, E>) -> ApiResult<T>
where
    E: DomainError,
{
    result.map_err(|error| error.to_api_error())
}

/// Coarse reason behind an I/O failure while preparing the log directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorHint {
    PermissionDenied,
    ReadOnlyFilesystem,
    Other,
}

pub fn classify_io_error(error: &std::io::Error) -> IoErrorHint {
    if error.kind() == ErrorKind::PermissionDenied {
        return IoErrorHint::PermissionDenied;
    }
    match error.raw_os_error() {
        #[cfg(unix)]
        Some(1 | 13) => IoErrorHint::PermissionDenied, // EPERM | EACCES
        #[cfg(unix)]
        Some(30) => IoErrorHint::ReadOnlyFilesystem, // EROFS
        #[cfg(windows)]
        Some(5) => IoErrorHint::PermissionDenied, // ERROR_ACCESS_DENIED
        #[cfg(windows)]
        Some(19) => IoErrorHint::ReadOnlyFilesystem, // ERROR_WRITE_PROTECT
        _ => IoErrorHint::Other,
    }
}
