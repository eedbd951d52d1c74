use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::session::split_roles;
use crate::auth::Session;

/// Body of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub roles: Vec<String>,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Session {
            token: resp.token,
            username: resp.username,
            roles: resp.roles,
        }
    }
}

/// Roles arrive as a JSON array, but a comma-joined string is accepted too.
fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RolesField {
        List(Vec<String>),
        Joined(String),
        Missing(()),
    }

    Ok(match RolesField::deserialize(deserializer)? {
        RolesField::List(roles) => roles,
        RolesField::Joined(raw) => split_roles(&raw),
        RolesField::Missing(()) => Vec::new(),
    })
}

/// Body of a successful demo call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DemoInfo {
    pub info: Option<String>,
}

/// Demo resources exposed under `demo/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoEndpoint {
    Anonymous,
    Authenticated,
    User,
    Admin,
    UserAdmin,
    UserFromToken,
}

impl DemoEndpoint {
    pub const ALL: [DemoEndpoint; 6] = [
        DemoEndpoint::Anonymous,
        DemoEndpoint::Authenticated,
        DemoEndpoint::User,
        DemoEndpoint::Admin,
        DemoEndpoint::UserAdmin,
        DemoEndpoint::UserFromToken,
    ];

    /// Command name, e.g. `user-admin`
    pub fn name(&self) -> &'static str {
        match self {
            DemoEndpoint::Anonymous => "anonymous",
            DemoEndpoint::Authenticated => "authenticated",
            DemoEndpoint::User => "user",
            DemoEndpoint::Admin => "admin",
            DemoEndpoint::UserAdmin => "user-admin",
            DemoEndpoint::UserFromToken => "user-from-token",
        }
    }

    /// Path relative to the API base URL.
    /// The server spells the last one `user-fromtoken`.
    pub fn path(&self) -> &'static str {
        match self {
            DemoEndpoint::Anonymous => "demo/anonymous",
            DemoEndpoint::Authenticated => "demo/authenticated",
            DemoEndpoint::User => "demo/user",
            DemoEndpoint::Admin => "demo/admin",
            DemoEndpoint::UserAdmin => "demo/user-admin",
            DemoEndpoint::UserFromToken => "demo/user-fromtoken",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, DemoEndpoint::Anonymous)
    }
}

impl fmt::Display for DemoEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        DemoEndpoint::ALL
            .iter()
            .copied()
            .find(|e| e.name() == lower || (lower == "user-fromtoken" && *e == DemoEndpoint::UserFromToken))
            .ok_or_else(|| format!("Unknown endpoint: {}", s))
    }
}
