//! Error types for Marine-Axis

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session expired. Run 'marine-axis login' to sign in again.")]
    SessionExpired,

    #[error("Not signed in. Run 'marine-axis login' first.")]
    NotAuthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file not found. Run 'marine-axis init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failed API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received (connection failure, timeout)
    Network,
    /// 400 / 422
    Validation,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx
    Server,
    Generic,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Generic,
        }
    }

    /// Message shown when the server did not provide one
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Network error. Please check your connection and try again.",
            ErrorKind::Validation => "Invalid request. Please check your input.",
            ErrorKind::Unauthorized => "Your session has expired. Please log in again.",
            ErrorKind::Forbidden => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Server => "Server error. Please try again later.",
            ErrorKind::Generic => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server",
            ErrorKind::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Normalized HTTP failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub url: String,
}

impl ApiError {
    /// A request that never produced a response
    pub fn network(url: impl Into<String>, detail: impl fmt::Display) -> Self {
        tracing::error!("Network error: {}", detail);
        Self {
            kind: ErrorKind::Network,
            status: None,
            message: ErrorKind::Network.default_message().to_string(),
            url: url.into(),
        }
    }

    /// A non-success HTTP status, preferring the server's own message
    pub fn from_status(status: u16, url: impl Into<String>, server_message: Option<String>) -> Self {
        let kind = ErrorKind::from_status(status);
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_string());
        Self {
            kind,
            status: Some(status),
            message,
            url: url.into(),
        }
    }

    /// A response that arrived but could not be understood
    pub fn malformed(url: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Generic,
            status: None,
            message: format!("Malformed response: {}", detail),
            url: url.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_status() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Generic);
    }

    #[test]
    fn test_server_message_preferred() {
        let err = ApiError::from_status(400, "/jobs", Some("Title is required".to_string()));
        assert_eq!(err.message, "Title is required");
        assert_eq!(err.status, Some(400));
    }

    #[test]
    fn test_blank_server_message_falls_back() {
        let err = ApiError::from_status(500, "/jobs", Some("  ".to_string()));
        assert_eq!(err.message, ErrorKind::Server.default_message());
    }
}
