use serde::Serialize;

use crate::api::{ApiError, ApiResult};

/// How a status line should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Failure,
    Info,
}

impl Severity {
    /// CSS color name used by the browser front end
    pub fn color_name(&self) -> &'static str {
        match self {
            Severity::Success => "darkgreen",
            Severity::Failure => "red",
            Severity::Info => "black",
        }
    }
}

/// Status text plus severity, ready for the presentation layer to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Failure,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
        }
    }

    /// Empty status line, shown when a login or logout starts
    pub fn cleared() -> Self {
        Self::info("")
    }

    pub fn from_error(err: &ApiError) -> Self {
        Self::failure(err.message())
    }

    pub fn from_result(result: &ApiResult<String>) -> Self {
        match result {
            Ok(info) => Self::success(info.clone()),
            Err(e) => Self::from_error(e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ok_result() {
        let notice = Notice::from_result(&Ok("hello".to_string()));
        assert_eq!(notice, Notice::success("hello"));
        assert_eq!(notice.severity.color_name(), "darkgreen");
    }

    #[test]
    fn test_from_auth_required() {
        let notice = Notice::from_result(&Err(ApiError::AuthRequired));
        assert_eq!(notice.text, "You must login to use this feature");
        assert_eq!(notice.severity, Severity::Failure);
        assert_eq!(notice.severity.color_name(), "red");
    }

    #[test]
    fn test_from_server_error_keeps_message_verbatim() {
        let err = ApiError::Server {
            status: 403,
            message: "Access denied: admin role needed".to_string(),
            payload: serde_json::json!({"message": "Access denied: admin role needed"}),
        };
        let notice = Notice::from_error(&err);
        assert_eq!(notice.text, "Access denied: admin role needed");
        assert!(!notice.is_success());
    }

    #[test]
    fn test_cleared() {
        let notice = Notice::cleared();
        assert!(notice.text.is_empty());
        assert_eq!(notice.severity, Severity::Info);
    }
}
