//! Error taxonomy for the HTTP layer.
//!
//! Callers branch on [`ApiErrorKind`] rather than parsing messages:
//! `Unauthorized` is the one kind with cross-component consequences (it must
//! be routed to the session's implicit-logout path), the rest are surfaced
//! where they occur.

use std::fmt;

use serde_json::Value;

/// Error category for a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Bearer credential rejected (401-class). Triggers implicit logout.
    Unauthorized,
    /// Server-side field rejection (400 with a field/message body).
    Validation,
    /// Transport failure (connect, timeout, broken stream).
    Network,
    /// Response body could not be decoded.
    Parse,
    /// Any other non-success HTTP status.
    Http,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Http => write!(f, "http"),
        }
    }
}

/// Structured error from the API with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category.
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display.
    pub message: String,
    /// Optional additional details (e.g. raw error body).
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Classifies a non-success HTTP response from its status and body.
    ///
    /// 401 maps to `Unauthorized`; a 400 carrying a DRF-style
    /// `{field: [messages]}` body maps to `Validation` with the first
    /// offending field in the message; everything else is `Http`.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return Self {
                kind: ApiErrorKind::Unauthorized,
                message: format!("HTTP {status}: credential rejected"),
                details: non_empty(body),
            };
        }

        if status == 400
            && let Some((field, message)) = first_field_error(body)
        {
            return Self {
                kind: ApiErrorKind::Validation,
                message: format!("{field}: {message}"),
                details: Some(body.to_string()),
            };
        }

        // Try to extract a cleaner message from a JSON error body
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json.get("error").and_then(Value::as_str)
        {
            return Self {
                kind: ApiErrorKind::Http,
                message: format!("HTTP {status}: {msg}"),
                details: Some(body.to_string()),
            };
        }

        Self {
            kind: ApiErrorKind::Http,
            message: format!("HTTP {status}"),
            details: non_empty(body),
        }
    }

    /// Creates a transport-level error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Creates a body-decode error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Returns true if this failure must be routed through the session's
    /// implicit-logout path.
    pub fn is_auth_failure(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::parse(e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

/// Convenience alias for API results.
pub type ApiResult<T> = Result<T, ApiError>;

fn non_empty(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

/// Extracts the first `field: message` pair from a DRF-style error body
/// like `{"email": ["Enter a valid email address."]}`.
fn first_field_error(body: &str) -> Option<(String, String)> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    let map = json.as_object()?;
    for (field, messages) in map {
        let message = match messages {
            Value::String(s) => s.clone(),
            Value::Array(items) => items.first()?.as_str()?.to_string(),
            _ => continue,
        };
        return Some((field.clone(), message));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_401_as_auth_failure() {
        let err = ApiError::from_status(401, r#"{"detail":"token expired"}"#);
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert!(err.is_auth_failure());
    }

    #[test]
    fn extracts_first_field_error_from_400() {
        let err = ApiError::from_status(400, r#"{"email":["Enter a valid email address."]}"#);
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert!(err.message.starts_with("email:"));
    }

    #[test]
    fn plain_400_is_not_validation() {
        let err = ApiError::from_status(400, "bad request");
        assert_eq!(err.kind, ApiErrorKind::Http);
    }

    #[test]
    fn surfaces_error_field_message() {
        let err = ApiError::from_status(403, r#"{"error":"You cannot edit someone else's post"}"#);
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert!(err.message.contains("cannot edit"));
    }
}
