use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    NoInput(String),
    MalformedInput(String),
    EmptyInput(String),
    DownstreamUnavailable(String),
    DownstreamBadResponse(String),
    UploadTooLarge(String),
    ConfigError(String),
    IoError(String),
    Internal(String),
}

impl AppError {
    /// Stable identifier exposed to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NoInput(_) => "no_input",
            AppError::MalformedInput(_) => "malformed_input",
            AppError::EmptyInput(_) => "empty_input",
            AppError::DownstreamUnavailable(_) => "downstream_unavailable",
            AppError::DownstreamBadResponse(_) => "downstream_bad_response",
            AppError::UploadTooLarge(_) => "upload_too_large",
            AppError::ConfigError(_) => "config_error",
            AppError::IoError(_) => "io_error",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::NoInput(msg)
            | AppError::MalformedInput(msg)
            | AppError::EmptyInput(msg)
            | AppError::DownstreamUnavailable(msg)
            | AppError::DownstreamBadResponse(msg)
            | AppError::UploadTooLarge(msg)
            | AppError::ConfigError(msg)
            | AppError::IoError(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NoInput(msg) => write!(f, "No input: {}", msg),
            AppError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            AppError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            AppError::DownstreamUnavailable(msg) => write!(f, "Downstream unavailable: {}", msg),
            AppError::DownstreamBadResponse(msg) => {
                write!(f, "Downstream bad response: {}", msg)
            }
            AppError::UploadTooLarge(msg) => write!(f, "Upload too large: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
