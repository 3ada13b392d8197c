//! Client-side JWT inspection
//!
//! The signing secret lives on the server. The client only reads the payload
//! to learn the role and expiry; it never treats a decoded token as proof of
//! anything beyond what the server will re-check on each request.

use crate::auth::models::UserRole;
use crate::error::{Error, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Claims the admin client cares about
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,
    /// Some backends put the user ID here instead of `sub`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiration time (epoch seconds)
    pub exp: i64,
}

impl Claims {
    /// User ID from whichever claim carries it
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .or(self.id.as_deref())
            .or(self.user_id.as_deref())
    }

    /// Valid iff expiry is strictly after `now`
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.exp > now
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        !self.is_valid_at(chrono::Utc::now().timestamp())
    }

    /// Seconds until expiry, negative once expired
    pub fn expires_in(&self, now: i64) -> i64 {
        self.exp - now
    }
}

/// Decode a token's claims without verifying its signature
pub fn decode_claims(token: &str) -> Result<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::InvalidToken("expected three segments".to_string()));
    }

    jsonwebtoken::decode_header(token).map_err(|e| Error::InvalidToken(e.to_string()))?;

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&payload)
        .map_err(|e| Error::InvalidToken(format!("unreadable claims: {}", e)))
}
