//! Error taxonomy for backend calls, auth forms and workflow guards.

use shared::error::{ApiError, ApiErrorBody, ErrorCode};
use thiserror::Error;

/// Shown in place of any transport or parse failure.
pub const CONNECTIVITY_MESSAGE: &str = "Error connecting to backend. Try again.";

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend returned status {status}: {}", message.as_deref().unwrap_or("<no message>"))]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn from_body(status: u16, body: &ApiErrorBody) -> Self {
        Self::Status {
            status,
            message: body.message().map(str::to_string),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.status().map(ErrorCode::from_status)
    }

    /// Backend-reported messages pass through verbatim, falling back to `fallback` when absent.
    /// Transport and parse failures collapse to [`CONNECTIVITY_MESSAGE`].
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Status { message: None, .. } => fallback.to_string(),
            Self::Transport(_) | Self::Decode(_) => CONNECTIVITY_MESSAGE.to_string(),
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(value: ApiError) -> Self {
        Self::Status {
            status: value.status,
            message: value.message,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Local form validation; never reaches the network.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    AccountExists(String),
    #[error("{0}")]
    Unavailable(String),
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Rejected(message)
            | Self::AccountExists(message)
            | Self::Unavailable(message) => message,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("select a style first")]
    NoStyleSelected,
    #[error("upload an image first")]
    NoImageUploaded,
    #[error("a transform is already in progress")]
    AlreadyProcessing,
    #[error("sign in to use the dashboard")]
    NotSignedIn,
    #[error("only image files can be uploaded (got {0})")]
    UnsupportedMediaType(String),
    #[error("history view is not open")]
    NotInHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_applies_fallback_and_connectivity_rules() {
        let reported = BackendError::Status {
            status: 500,
            message: Some("CUDA out of memory".into()),
        };
        assert_eq!(reported.user_message("Something went wrong."), "CUDA out of memory");

        let silent = BackendError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(silent.user_message("Something went wrong."), "Something went wrong.");

        let transport = BackendError::Transport("connection refused".into());
        assert_eq!(transport.user_message("ignored"), CONNECTIVITY_MESSAGE);
        assert_eq!(
            BackendError::Decode("expected value".into()).user_message("ignored"),
            CONNECTIVITY_MESSAGE
        );
    }

    #[test]
    fn status_errors_expose_code() {
        let err = BackendError::from_body(409, &ApiErrorBody::new("Account already exists"));
        assert_eq!(err.code(), Some(ErrorCode::Conflict));
        assert_eq!(BackendError::Transport("x".into()).code(), None);
    }
}
