//! Authentication models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles carried in the access token's `role` claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Platform owner - full access including admin management
    SuperAdmin,
    /// Administrator - manages marketplace content
    Admin,
    /// Marine service provider
    Provider,
    Customer,
    /// Any role this client does not know about
    Other(String),
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "superadmin" | "super_admin" | "super-admin" => UserRole::SuperAdmin,
            "admin" => UserRole::Admin,
            "provider" => UserRole::Provider,
            "customer" => UserRole::Customer,
            _ => UserRole::Other(value),
        }
    }
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        UserRole::from(value.to_string())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "superadmin"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::Provider => write!(f, "provider"),
            UserRole::Customer => write!(f, "customer"),
            UserRole::Other(role) => write!(f, "{}", role),
        }
    }
}

/// True when `role` is exactly `required`
pub fn has_role(role: Option<&UserRole>, required: &UserRole) -> bool {
    role == Some(required)
}

/// True when `role` is any of `required`; an empty set admits every role
pub fn can_access(role: Option<&UserRole>, required: &[UserRole]) -> bool {
    match role {
        Some(role) => required.is_empty() || required.contains(role),
        None => false,
    }
}

/// Cached record of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: UserRole,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Login response payload (inside the envelope's `data`)
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(default)]
    pub user: Option<User>,
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}
