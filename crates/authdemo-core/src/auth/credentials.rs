use std::fmt;

use serde::Serialize;

/// Login credentials supplied by the user. Never persisted.
#[derive(Clone, Serialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject an empty username or password before a login request is sent.
    /// Anything else is left for the server to judge.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("Username and password required".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let cred = Credential::new("alice", "hunter2");
        let out = format!("{:?}", cred);
        assert!(out.contains("alice"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_serializes_as_login_body() {
        let cred = Credential::new("alice", "secret");
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json, serde_json::json!({"username": "alice", "password": "secret"}));
    }

    #[test]
    fn test_validate() {
        assert!(Credential::new("alice", "secret").validate().is_ok());
        assert!(Credential::new("", "secret").validate().is_err());
        assert!(Credential::new("   ", "secret").validate().is_err());
        assert!(Credential::new("alice", "").validate().is_err());
    }

    #[test]
    fn test_validate_leaves_length_and_content_to_server() {
        assert!(Credential::new("a".repeat(200), "secret").validate().is_ok());
        assert!(Credential::new("alice", "p".repeat(500)).validate().is_ok());
        assert!(Credential::new("alice", "tab\tin password").validate().is_ok());
    }
}
