//! Firebase ID token verification
//!
//! ID tokens are RS256 JWTs signed by Google's securetoken service. The
//! public keys are published as a JWK set and cached for as long as the
//! response's `Cache-Control: max-age` allows.

use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Longest accepted `sub` claim, in characters.
const MAX_SUBJECT_LENGTH: usize = 128;

/// Longest time public keys are cached, whatever `max-age` says.
const MAX_KEY_CACHE_SECS: u64 = 24 * 60 * 60;

/// Claims of a verified Firebase ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// User ID (the `sub` claim)
    #[serde(rename = "sub")]
    pub uid: String,

    /// Issuer
    pub iss: String,

    /// Audience (the project ID)
    pub aud: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Time the user authenticated
    #[serde(default)]
    pub auth_time: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub email_verified: Option<bool>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,

    /// Sign-in details
    #[serde(default)]
    pub firebase: FirebaseInfo,

    /// Custom and remaining claims
    #[serde(flatten)]
    pub custom_claims: Map<String, Value>,
}

/// The `firebase` claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirebaseInfo {
    /// Provider used to sign in (e.g. `password`, `phone`, `custom`)
    #[serde(default)]
    pub sign_in_provider: String,

    /// Provider identities by provider ID
    #[serde(default)]
    pub identities: Map<String, Value>,

    /// Tenant of the user
    #[serde(default)]
    pub tenant: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: Instant,
}

/// Public signing keys, cached per `Cache-Control: max-age`.
pub struct PublicKeyStore {
    http: Client,
    url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl PublicKeyStore {
    /// Keys published at `url`.
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            cache: RwLock::new(None),
        }
    }

    /// Decoding key for `kid`.
    pub async fn key(&self, kid: &str) -> AdminResult<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.expires_at > Instant::now()) {
                return find_key(&cached.keys, kid);
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref().filter(|c| c.expires_at > Instant::now()) {
            return find_key(&cached.keys, kid);
        }

        let (keys, max_age) = self.fetch().await?;
        let key = find_key(&keys, kid);
        let now = Instant::now();
        *cache = Some(CachedKeys {
            keys,
            expires_at: now.checked_add(max_age).unwrap_or(now),
        });
        key
    }

    async fn fetch(&self) -> AdminResult<(JwkSet, Duration)> {
        debug!(url = %self.url, "Fetching public keys");

        let response = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AdminError::CertificateFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Public key fetch failed");
            return Err(AdminError::CertificateFetch(format!(
                "HTTP {} from {}",
                status.as_u16(),
                self.url
            )));
        }

        let max_age = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(Duration::ZERO);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| AdminError::CertificateFetch(format!("invalid JWK set: {}", e)))?;

        Ok((keys, max_age))
    }
}

fn find_key(keys: &JwkSet, kid: &str) -> AdminResult<DecodingKey> {
    let jwk = keys.find(kid).ok_or_else(|| {
        AdminError::InvalidIdToken(format!(
            "Firebase ID token has a \"kid\" claim ({}) that does not correspond to a known public key",
            kid
        ))
    })?;
    DecodingKey::from_jwk(jwk)
        .map_err(|e| AdminError::CertificateFetch(format!("invalid public key {}: {}", kid, e)))
}

/// `max-age` directive of a Cache-Control value.
fn parse_max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(MAX_KEY_CACHE_SECS)))
}

/// Verifies Firebase ID tokens for one project.
pub struct IdTokenVerifier {
    project_id: String,
    issuer: String,
    tenant_id: Option<String>,
    clock_skew_secs: i64,
    emulator: bool,
    keys: PublicKeyStore,
}

impl IdTokenVerifier {
    /// Create a verifier from `config`, fetching keys with `http`.
    pub fn new(config: &AdminConfig, http: Client) -> Self {
        Self {
            project_id: config.project_id.clone(),
            issuer: config.issuer(),
            tenant_id: config.tenant_id.clone(),
            clock_skew_secs: i64::try_from(config.clock_skew_secs).unwrap_or(i64::MAX),
            emulator: config.is_emulator(),
            keys: PublicKeyStore::new(http, config.jwks_url.clone()),
        }
    }

    /// Verify `token` and return its claims.
    ///
    /// Revocation is not checked here; see `AuthClient::verify_id_token`.
    #[instrument(skip(self, token), fields(project_id = %self.project_id))]
    pub async fn verify(&self, token: &str) -> AdminResult<FirebaseClaims> {
        if token.split('.').count() != 3 {
            return Err(AdminError::InvalidIdToken(
                "Firebase ID token must have three segments".to_string(),
            ));
        }

        let claims = if self.emulator {
            decode_unverified(token)?
        } else {
            self.decode_signed(token).await?
        };

        self.check_claims(&claims)?;
        Ok(claims)
    }

    async fn decode_signed(&self, token: &str) -> AdminResult<FirebaseClaims> {
        let header = decode_header(token)
            .map_err(|e| AdminError::InvalidIdToken(format!("invalid JWT header: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(AdminError::InvalidIdToken(format!(
                "Firebase ID token has incorrect algorithm. Expected RS256 but got {:?}",
                header.alg
            )));
        }

        let kid = header.kid.ok_or_else(|| {
            AdminError::InvalidIdToken("Firebase ID token has no \"kid\" claim".to_string())
        })?;

        let key = self.keys.key(&kid).await?;

        // Time and audience claims are checked afterwards with our own errors
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        decode::<FirebaseClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AdminError::InvalidIdToken(format!("invalid signature: {}", e)))
    }

    fn check_claims(&self, claims: &FirebaseClaims) -> AdminResult<()> {
        let now = Utc::now().timestamp();

        if claims.aud != self.project_id {
            return Err(AdminError::InvalidIdToken(format!(
                "Firebase ID token has incorrect \"aud\" (audience) claim. Expected {:?} but got {:?}",
                self.project_id, claims.aud
            )));
        }
        if claims.iss != self.issuer {
            return Err(AdminError::InvalidIdToken(format!(
                "Firebase ID token has incorrect \"iss\" (issuer) claim. Expected {:?} but got {:?}",
                self.issuer, claims.iss
            )));
        }
        if claims.uid.is_empty() || claims.uid.chars().count() > MAX_SUBJECT_LENGTH {
            return Err(AdminError::InvalidIdToken(
                "Firebase ID token has an invalid \"sub\" (subject) claim".to_string(),
            ));
        }
        if claims.iat > now + self.clock_skew_secs {
            return Err(AdminError::InvalidIdToken(
                "Firebase ID token issued at future timestamp".to_string(),
            ));
        }
        match claims.auth_time {
            Some(auth_time) if auth_time <= 0 => {
                return Err(AdminError::InvalidIdToken(
                    "Firebase ID token has an invalid \"auth_time\" claim".to_string(),
                ))
            }
            Some(auth_time) if auth_time <= now + self.clock_skew_secs => {}
            Some(_) => {
                return Err(AdminError::InvalidIdToken(
                    "Firebase ID token has a future \"auth_time\" claim".to_string(),
                ))
            }
            None => {
                return Err(AdminError::InvalidIdToken(
                    "Firebase ID token has no \"auth_time\" claim".to_string(),
                ))
            }
        }
        if claims.exp <= now - self.clock_skew_secs {
            return Err(AdminError::ExpiredIdToken);
        }
        if let Some(tenant) = &self.tenant_id {
            if claims.firebase.tenant.as_deref() != Some(tenant.as_str()) {
                return Err(AdminError::InvalidIdToken(format!(
                    "Firebase ID token belongs to tenant {:?}, expected {:?}",
                    claims.firebase.tenant, tenant
                )));
            }
        }
        Ok(())
    }
}

/// Emulator tokens are unsigned; only the payload is read.
fn decode_unverified(token: &str) -> AdminResult<FirebaseClaims> {
    let payload = token.split('.').nth(1).unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AdminError::InvalidIdToken(format!("invalid base64 payload: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AdminError::InvalidIdToken(format!("invalid JWT claims: {}", e)))
}
