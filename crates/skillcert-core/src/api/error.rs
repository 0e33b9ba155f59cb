use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// 401: missing, invalid or expired token, or bad credentials.
    Unauthorized,
    /// 403: authenticated but not allowed (e.g. non-admin).
    Forbidden,
    /// Other 4xx: the server refused the request for a business reason.
    Rejected,
    /// 5xx
    Server,
    /// Connection could not be established or was dropped.
    Network,
    /// Request exceeded the configured timeout.
    Timeout,
    /// Response body did not match the expected shape.
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiErrorKind::Unauthorized => "unauthorized",
            ApiErrorKind::Forbidden => "forbidden",
            ApiErrorKind::Rejected => "rejected",
            ApiErrorKind::Server => "server",
            ApiErrorKind::Network => "network",
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::Parse => "parse",
        };
        f.write_str(label)
    }
}

/// Structured error from the portal API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// One-line summary suitable for display. Prefers the server's `error` text.
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Builds an error from a non-success status and its body.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            400..=499 => ApiErrorKind::Rejected,
            _ => ApiErrorKind::Server,
        };
        let message = server_error_text(body).unwrap_or_else(|| format!("HTTP {status}"));
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(ApiErrorKind::Timeout, format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::new(ApiErrorKind::Network, format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::parse(format!("Invalid response body: {e}"))
        } else {
            Self::new(ApiErrorKind::Network, format!("Network error: {e}"))
        }
    }

    /// The server's own explanation, when the response carried one.
    pub fn server_message(&self) -> Option<&str> {
        let status = self.status?;
        (self.message != format!("HTTP {status}")).then_some(self.message.as_str())
    }

    /// True when the server rejected the caller's identity.
    pub fn is_auth_failure(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Extracts `{"error": "..."}` (or `{"message": "..."}`) from an error body.
fn server_error_text(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| json.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_uses_server_error_text() {
        let err = ApiError::http_status(400, r#"{"error": "Repayment not required yet"}"#);
        assert_eq!(err.kind, ApiErrorKind::Rejected);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.to_string(), "Repayment not required yet");
    }

    #[test]
    fn test_http_status_classification() {
        assert!(ApiError::http_status(401, "").is_auth_failure());
        assert_eq!(ApiError::http_status(403, "").kind, ApiErrorKind::Forbidden);
        assert_eq!(ApiError::http_status(404, "").kind, ApiErrorKind::Rejected);
        assert_eq!(ApiError::http_status(502, "").kind, ApiErrorKind::Server);
    }

    #[test]
    fn test_http_status_without_json_body() {
        let err = ApiError::http_status(500, "<html>boom</html>");
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(err.server_message().is_none());
    }

    #[test]
    fn test_server_message_only_for_responses() {
        let err = ApiError::http_status(400, r#"{"error": "No attempts to reset"}"#);
        assert_eq!(err.server_message(), Some("No attempts to reset"));
        assert!(ApiError::new(ApiErrorKind::Network, "down").server_message().is_none());
    }
}
