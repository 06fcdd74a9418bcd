//! Bearer token transport
//!
//! Reads the token from an `Authorization: Bearer <token>` header and
//! shapes the login response body.

use serde::{Deserialize, Serialize};

/// Carries tokens in the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerTransport {
    token_url: String,
}

impl BearerTransport {
    /// Create a transport advertising `token_url` as the login endpoint.
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
        }
    }

    /// Login endpoint advertised to clients.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Extract the token from an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively. A missing header, another
    /// scheme, or an empty token all yield `None`.
    pub fn token<'a>(&self, authorization: Option<&'a str>) -> Option<&'a str> {
        let authorization = authorization?.trim();
        let (scheme, token) = authorization
            .split_once(' ')
            .unwrap_or((authorization, ""));

        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Body returned by a successful login.
    pub fn login_response(&self, access_token: impl Into<String>) -> BearerResponse {
        BearerResponse {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
        }
    }
}

impl Default for BearerTransport {
    fn default() -> Self {
        Self::new("auth/login")
    }
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BearerResponse {
    /// The issued token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}
