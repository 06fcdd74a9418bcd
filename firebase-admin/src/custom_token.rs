//! Custom tokens signed by the service account.
//!
//! Clients exchange a custom token for an ID token through a Firebase client
//! SDK (`signInWithCustomToken`).

use crate::credentials::ServiceAccountKey;
use crate::error::{AdminError, AdminResult};
use crate::validate;
use chrono::{Duration, Utc};
use jsonwebtoken::encode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Audience of Firebase custom tokens.
pub const CUSTOM_TOKEN_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Lifetime of a custom token.
const CUSTOM_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Custom token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Sign a custom token for `uid` carrying `developer_claims`.
pub fn sign_custom_token(
    key: &ServiceAccountKey,
    uid: &str,
    developer_claims: Option<&Map<String, Value>>,
    tenant_id: Option<&str>,
) -> AdminResult<String> {
    validate::uid(uid)?;
    if let Some(claims) = developer_claims {
        validate::reserved_claims(claims)?;
    }

    let now = Utc::now();
    let claims = CustomTokenClaims {
        iss: key.client_email.clone(),
        sub: key.client_email.clone(),
        aud: CUSTOM_TOKEN_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(CUSTOM_TOKEN_LIFETIME_SECS)).timestamp(),
        uid: uid.to_string(),
        claims: developer_claims.filter(|c| !c.is_empty()).cloned(),
        tenant_id: tenant_id.map(str::to_string),
    };

    encode(&key.jwt_header(), &claims, &key.encoding_key()?)
        .map_err(|e| AdminError::Credentials(format!("Failed to sign custom token: {}", e)))
}
