//! Error handling for the ArtFusion client

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the ArtFusion client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local IO errors (session file, image upload)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Token decoding errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Form validation failed; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The backend rejected the request
    #[error("Request rejected ({status}): {errors}")]
    Api { status: StatusCode, errors: ApiErrors },

    /// Missing, invalid or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The current role may not perform this action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The moderation pre-check refused a comment
    #[error("Comment rejected by moderation: {0}")]
    ModerationRejected(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

/// Coarse classification of failures, matching how callers react to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connectivity problem; prior state is kept
    Network,
    /// Inline field errors raised before dispatch
    Validation,
    /// The backend (or a local guard) refused the payload
    Rejected,
    /// The session must be re-established
    Authorization,
    /// Local failures that fit none of the above
    Internal,
}

impl Error {
    /// Create a new unauthorized error
    pub fn unauthorized<T: fmt::Display>(msg: T) -> Self {
        Error::Unauthorized(msg.to_string())
    }

    /// Create a new forbidden error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) => ErrorKind::Network,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Api { .. }
            | Error::NotFound(_)
            | Error::Forbidden(_)
            | Error::ModerationRejected(_) => ErrorKind::Rejected,
            Error::Unauthorized(_) => ErrorKind::Authorization,
            _ => ErrorKind::Internal,
        }
    }

    /// Field-level messages, either local or returned by the backend
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            Error::Api { errors, .. } => Some(&errors.fields),
            _ => None,
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(errors: FieldErrors) -> Self {
        Error::Validation(errors)
    }
}

/// Error payload returned by the backend on a rejected request
///
/// The backend answers with either `{"detail": "..."}`, `{"error": "..."}`,
/// or a map of field names to message lists (`non_field_errors` included).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrors {
    pub detail: Option<String>,
    pub fields: FieldErrors,
}

impl ApiErrors {
    /// Parse a response body; anything that is not JSON becomes `detail`
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => {
                let trimmed = body.trim();
                Self {
                    detail: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    fields: FieldErrors::new(),
                }
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let mut errors = Self::default();
        match value {
            Value::Object(map) => {
                for (key, entry) in map {
                    match key.as_str() {
                        "detail" | "error" | "message" if errors.detail.is_none() => {
                            errors.detail = message_text(entry);
                        }
                        _ => {
                            for message in messages(entry) {
                                errors.fields.add(key, message);
                            }
                        }
                    }
                }
            }
            Value::Array(items) => {
                for message in items.iter().filter_map(message_text) {
                    errors.fields.add("non_field_errors", message);
                }
            }
            other => errors.detail = message_text(other),
        }
        errors
    }

    /// One-line summary: the detail if present, otherwise `field: first message` pairs
    pub fn summary(&self) -> String {
        if let Some(detail) = &self.detail {
            return detail.clone();
        }
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|(field, messages)| {
                messages.first().map(|message| format!("{}: {}", field, message))
            })
            .collect();
        if parts.is_empty() {
            "unknown error".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        Value::Array(items) => items.iter().find_map(message_text),
        other => Some(other.to_string()),
    }
}

fn messages(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(message_text).collect(),
        other => message_text(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_field_errors() {
        let errors = ApiErrors::from_value(&json!({
            "email": ["Email already exists."],
            "password": ["Ensure this field has at least 6 characters."]
        }));
        assert_eq!(errors.detail, None);
        assert_eq!(errors.fields.first("email"), Some("Email already exists."));
        assert_eq!(
            errors.summary(),
            "email: Email already exists., password: Ensure this field has at least 6 characters."
        );
    }

    #[test]
    fn detail_wins_summary() {
        let errors = ApiErrors::parse(r#"{"detail": "No active account found"}"#);
        assert_eq!(errors.summary(), "No active account found");
    }

    #[test]
    fn plain_text_body_becomes_detail() {
        let errors = ApiErrors::parse("Internal Server Error");
        assert_eq!(errors.detail.as_deref(), Some("Internal Server Error"));
        assert!(errors.fields.is_empty());
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::Validation(FieldErrors::new()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::unauthorized("expired").kind(), ErrorKind::Authorization);
        assert_eq!(Error::forbidden("role").kind(), ErrorKind::Rejected);
        assert_eq!(Error::general("x").kind(), ErrorKind::Internal);
    }
}
