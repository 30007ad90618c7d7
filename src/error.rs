use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the select → submit → display cycle.
///
/// Validation and busy rejections never reach the network. Transport, status
/// and malformed-response failures all look the same to the user: a generic
/// failure notice and a retryable session.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("A prediction request is already in flight")]
    InFlight,

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Inference service responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Busy,
    Transport,
    MalformedResponse,
    Config,
    Io,
    Internal,
}

impl PredictError {
    pub fn validation(reason: impl Into<String>) -> Self {
        PredictError::Validation {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        PredictError::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Validation { .. } => ErrorKind::Validation,
            PredictError::InFlight => ErrorKind::Busy,
            PredictError::Transport { .. } | PredictError::Status { .. } => ErrorKind::Transport,
            PredictError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }

    /// Text shown to the user. Everything past validation collapses into one
    /// generic message; details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PredictError::Validation { reason } => reason.clone(),
            PredictError::InFlight => "A prediction is already running.".to_string(),
            _ => "Error during prediction.".to_string(),
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PredictError::Status {
                status: status.as_u16(),
            },
            None => PredictError::Transport {
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid environment override {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Invalid configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Error returned across the IPC boundary.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError {
            kind: ErrorKind::Config,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError {
            kind: ErrorKind::Io,
            message: err.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError {
            kind: ErrorKind::Internal,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        PredictError::from(err).into()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError {
            kind: ErrorKind::Internal,
            message: err.to_string(),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError {
            kind: ErrorKind::Internal,
            message: msg,
        }
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError {
            kind: ErrorKind::Internal,
            message: msg.to_string(),
        }
    }
}
