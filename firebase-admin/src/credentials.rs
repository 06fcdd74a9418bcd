//! Service account credentials and OAuth access tokens.
//!
//! Admin calls to the Identity Toolkit API carry an OAuth 2.0 access token.
//! With a service account key, the token comes from a signed JWT-bearer
//! assertion exchanged at the Google token endpoint. Against the Auth
//! emulator a fixed `owner` token is used instead.

use crate::error::{AdminError, AdminResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument};

/// Default Google OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested for admin access tokens.
const ADMIN_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/firebase",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Seconds before expiry at which a cached access token is refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Google service account key (the downloaded JSON key file).
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    /// Project the service account belongs to
    #[serde(default)]
    pub project_id: String,

    /// ID of the signing key
    #[serde(default)]
    pub private_key_id: String,

    /// PEM-encoded RSA private key
    pub private_key: String,

    /// Service account email
    pub client_email: String,

    /// Numeric client ID
    #[serde(default)]
    pub client_id: String,

    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[REDACTED]")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON representation.
    pub fn from_json(json: &str) -> AdminResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AdminError::Credentials(format!("Invalid service account key: {}", e)))
    }

    /// Read and parse a key file.
    pub fn from_file(path: impl AsRef<Path>) -> AdminResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AdminError::Credentials(format!(
                "Failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// RS256 signing key built from the PEM private key.
    pub fn encoding_key(&self) -> AdminResult<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| AdminError::Credentials(format!("Failed to parse private key: {}", e)))
    }

    /// JWT header for tokens signed with this key.
    pub fn jwt_header(&self) -> Header {
        let mut header = Header::new(Algorithm::RS256);
        if !self.private_key_id.is_empty() {
            header.kid = Some(self.private_key_id.clone());
        }
        header
    }
}

/// Source of access tokens for admin API calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A currently valid access token.
    async fn access_token(&self) -> AdminResult<String>;
}

/// A fixed access token.
///
/// The Auth emulator accepts the token `owner` for admin calls.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Create a static token source.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token accepted by the Auth emulator.
    pub fn emulator() -> Self {
        Self::new("owner")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> AdminResult<String> {
        Ok(self.0.clone())
    }
}

/// Assertion claims for the JWT-bearer grant.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    access_token: String,
    expires_at: i64,
}

/// Access tokens obtained with a service account key.
///
/// The current token is reused until shortly before it expires.
pub struct ServiceAccountCredentials {
    key: Arc<ServiceAccountKey>,
    http: Client,
    cached: Mutex<Option<CachedAccessToken>>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.key.client_email)
            .finish()
    }
}

impl ServiceAccountCredentials {
    /// Create credentials from a key, using `http` for the token exchange.
    pub fn new(key: Arc<ServiceAccountKey>, http: Client) -> Self {
        Self {
            key,
            http,
            cached: Mutex::new(None),
        }
    }

    /// The underlying key.
    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    fn signed_assertion(&self) -> AdminResult<String> {
        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            scope: ADMIN_SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        encode(&self.key.jwt_header(), &claims, &self.key.encoding_key()?)
            .map_err(|e| AdminError::Credentials(format!("Failed to encode JWT: {}", e)))
    }

    async fn fetch(&self) -> AdminResult<CachedAccessToken> {
        let assertion = self.signed_assertion()?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = status.as_u16(), "Access token request failed");
            return Err(AdminError::Credentials(format!(
                "Token request failed with status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: OAuthTokenResponse = response
            .json()
            .await
            .map_err(|e| AdminError::Credentials(format!("Failed to parse token response: {}", e)))?;

        Ok(CachedAccessToken {
            access_token: token.access_token,
            expires_at: Utc::now().timestamp() + token.expires_in,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountCredentials {
    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    async fn access_token(&self) -> AdminResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now().timestamp() + REFRESH_MARGIN_SECS {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Fetching a new access token");
        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
