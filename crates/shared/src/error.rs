use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500..=599 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// The `{ "error": "..." }` body the backend attaches to failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Parses a response body, treating anything that is not the expected JSON as "no message".
    pub fn parse_lenient(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{code:?} ({status}): {}", message.as_deref().unwrap_or("<no message>"))]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, body: &ApiErrorBody) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: body.message().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_tolerates_html_and_blank_messages() {
        assert!(ApiErrorBody::parse_lenient("<html>oops</html>").message().is_none());
        assert!(ApiErrorBody::parse_lenient(r#"{"error":"  "}"#).message().is_none());
        assert_eq!(
            ApiErrorBody::parse_lenient(r#"{"error":"Account already exists"}"#).message(),
            Some("Account already exists")
        );
    }

    #[test]
    fn classifies_statuses() {
        assert_eq!(ErrorCode::from_status(409), ErrorCode::Conflict);
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::Internal);
        assert_eq!(ErrorCode::from_status(418), ErrorCode::Unknown);
    }
}
