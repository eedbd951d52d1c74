use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message shown when a protected call is attempted while logged out
pub const AUTH_REQUIRED_MESSAGE: &str = "You must login to use this feature";

/// Coarse error category, for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The server answered 4xx/5xx with a JSON error body
    ApiError,
    /// No local token for a protected call; nothing was sent
    AuthRequired,
    /// Transport failure or a body that is not valid JSON
    NetworkOrParseError,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        /// Full error body as returned by the server
        payload: Value,
    },

    #[error("{}", AUTH_REQUIRED_MESSAGE)]
    AuthRequired,

    #[error("{0}")]
    NetworkOrParse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build the error for a non-2xx response.
    ///
    /// The body must be JSON. Its `message` field is surfaced verbatim; when
    /// absent the status line stands in for it.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let payload: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => return Self::parse(&e),
        };

        let message = match payload.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => status.to_string(),
            Some(other) => other.to_string(),
        };

        ApiError::Server {
            status: status.as_u16(),
            message,
            payload,
        }
    }

    pub fn network(err: &anyhow::Error) -> Self {
        ApiError::NetworkOrParse(format!("{:#}", err))
    }

    pub fn parse(err: &serde_json::Error) -> Self {
        ApiError::NetworkOrParse(format!("Invalid JSON response: {}", err))
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Server { .. } => ApiErrorKind::ApiError,
            ApiError::AuthRequired => ApiErrorKind::AuthRequired,
            ApiError::NetworkOrParse(_) => ApiErrorKind::NetworkOrParseError,
        }
    }

    /// Message suitable for display to the user
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, for server-reported errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured error body, for server-reported errors
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Server { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_extracts_message() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"code":401,"message":"bad credentials"}"#);
        assert_eq!(err.kind(), ApiErrorKind::ApiError);
        assert_eq!(err.message(), "bad credentials");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.payload().and_then(|p| p.get("code")), Some(&serde_json::json!(401)));
    }

    #[test]
    fn test_from_status_without_message_uses_status_line() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "{}");
        assert_eq!(err.kind(), ApiErrorKind::ApiError);
        assert_eq!(err.message(), "404 Not Found");
    }

    #[test]
    fn test_from_status_non_string_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":["a","b"]}"#);
        assert_eq!(err.message(), r#"["a","b"]"#);
    }

    #[test]
    fn test_from_status_non_json_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert_eq!(err.kind(), ApiErrorKind::NetworkOrParseError);
        assert!(err.message().starts_with("Invalid JSON response"));
        assert!(err.payload().is_none());
    }

    #[test]
    fn test_auth_required_message() {
        assert_eq!(ApiError::AuthRequired.message(), "You must login to use this feature");
        assert_eq!(ApiError::AuthRequired.kind(), ApiErrorKind::AuthRequired);
    }

    #[test]
    fn test_network_error_keeps_chain() {
        let err = anyhow::anyhow!("connection refused").context("Failed to send request");
        let api = ApiError::network(&err);
        assert_eq!(api.kind(), ApiErrorKind::NetworkOrParseError);
        assert_eq!(api.message(), "Failed to send request: connection refused");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(ApiError::truncate_body("short"), "short");
        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
