//! HTTP basic authentication against a single configured credential pair.

use crate::error::{QueryError, Result};
use base64::Engine;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an `Authorization: Basic <base64(user:password)>` header value.
    pub fn from_authorization_header(value: &str) -> Result<Self> {
        let (scheme, encoded) = value
            .trim()
            .split_once(' ')
            .ok_or(QueryError::Unauthorized)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(QueryError::Unauthorized);
        }

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| QueryError::Unauthorized)?;
        let decoded = String::from_utf8(decoded).map_err(|_| QueryError::Unauthorized)?;

        let (username, password) = decoded.split_once(':').ok_or(QueryError::Unauthorized)?;
        Ok(Self::new(username, password))
    }

    /// Encode as an `Authorization` header value.
    pub fn to_authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw))
    }

    pub fn matches(&self, expected: &Credentials) -> bool {
        self.username == expected.username && self.password == expected.password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("admin", "secret123")
    }
}

/// Check an optional `Authorization` header against the expected pair.
pub fn authorize(header: Option<&str>, expected: &Credentials) -> Result<()> {
    let header = header.ok_or(QueryError::Unauthorized)?;
    let supplied = Credentials::from_authorization_header(header)?;
    if supplied.matches(expected) {
        Ok(())
    } else {
        debug!("Rejected credentials for user '{}'", supplied.username);
        Err(QueryError::Unauthorized)
    }
}
