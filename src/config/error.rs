use crate::errors::{
    domain::{self, classify_io_error, DomainError, ErrorCode, IoErrorHint},
    ApiResult,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    InvalidValue,
    ParseFailed,
    PermissionDenied,
    LoggingUnavailable,
}

impl ErrorCode for ConfigErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::InvalidValue => "invalid_value",
            Self::ParseFailed => "parse_failed",
            Self::PermissionDenied => "permission_denied",
            Self::LoggingUnavailable => "logging_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn new(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_io_error(context: impl Into<String>, error: std::io::Error) -> Self {
        let code = match classify_io_error(&error) {
            IoErrorHint::PermissionDenied | IoErrorHint::ReadOnlyFilesystem => {
                ConfigErrorCode::PermissionDenied
            }
            _ => ConfigErrorCode::LoggingUnavailable,
        };
        Self::new(code, format!("{}: {error}", context.into()))
    }

    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl DomainError for ConfigError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub fn map_api_result<T>(result: ConfigResult<T>) -> ApiResult<T> {
    domain::map_api_result(result)
}
