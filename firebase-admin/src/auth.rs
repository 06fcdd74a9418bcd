//! Firebase Authentication admin client.
//!
//! HTTP client for the Identity Toolkit v1 API. Provides user management,
//! ID token verification with optional revocation checks, and custom token
//! minting.

use crate::config::AdminConfig;
use crate::credentials::{ServiceAccountCredentials, StaticToken, TokenSource};
use crate::custom_token::sign_custom_token;
use crate::error::{AdminError, AdminResult};
use crate::token_verifier::{FirebaseClaims, IdTokenVerifier};
use crate::user_record::{CreateRequest, RawUserRecord, UpdateRequest, UserRecord};
use crate::validate::{self, mask_email, mask_phone};
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Firebase Authentication admin client.
pub struct AuthClient {
    /// HTTP client instance.
    client: Client,

    /// Project, tenant and endpoint configuration.
    config: AdminConfig,

    /// Access tokens for admin calls.
    tokens: Arc<dyn TokenSource>,

    /// ID token verifier with its key cache.
    verifier: IdTokenVerifier,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("project_id", &self.config.project_id)
            .field("tenant_id", &self.config.tenant_id)
            .field("emulator", &self.config.is_emulator())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<RawUserRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalIdResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl AuthClient {
    /// Create a client from `config`.
    ///
    /// The emulator is called with the `owner` token; otherwise the
    /// configured service account key provides access tokens.
    pub fn new(config: AdminConfig) -> AdminResult<Self> {
        let client = build_http_client(&config)?;

        let tokens: Arc<dyn TokenSource> = if config.is_emulator() {
            Arc::new(StaticToken::emulator())
        } else {
            let key = config.credentials.clone().ok_or_else(|| {
                AdminError::Config("a service account key is required outside the emulator".to_string())
            })?;
            Arc::new(ServiceAccountCredentials::new(Arc::new(key), client.clone()))
        };

        Ok(Self::assemble(client, config, tokens))
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> AdminResult<Self> {
        Self::new(AdminConfig::from_env()?)
    }

    /// Create a client using `tokens` for admin access tokens.
    pub fn with_token_source(config: AdminConfig, tokens: Arc<dyn TokenSource>) -> AdminResult<Self> {
        let client = build_http_client(&config)?;
        Ok(Self::assemble(client, config, tokens))
    }

    fn assemble(client: Client, config: AdminConfig, tokens: Arc<dyn TokenSource>) -> Self {
        let verifier = IdTokenVerifier::new(&config, client.clone());
        Self {
            client,
            config,
            tokens,
            verifier,
        }
    }

    /// Client configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Look up a user by uid.
    #[instrument(skip(self))]
    pub async fn get_user(&self, uid: &str) -> AdminResult<UserRecord> {
        validate::uid(uid)?;
        debug!("Looking up user by uid");
        self.lookup(json!({ "localId": [uid] })).await
    }

    /// Look up a user by email.
    #[instrument(skip(self, email), fields(email = %mask_email(email)))]
    pub async fn get_user_by_email(&self, email: &str) -> AdminResult<UserRecord> {
        validate::email(email)?;
        debug!("Looking up user by email");
        self.lookup(json!({ "email": [email] })).await
    }

    /// Look up a user by phone number.
    #[instrument(skip(self, phone_number), fields(phone = %mask_phone(phone_number)))]
    pub async fn get_user_by_phone_number(&self, phone_number: &str) -> AdminResult<UserRecord> {
        validate::phone_number(phone_number)?;
        debug!("Looking up user by phone number");
        self.lookup(json!({ "phoneNumber": [phone_number] })).await
    }

    /// Create a user and return its record.
    #[instrument(skip(self, request), fields(uid = ?request.uid))]
    pub async fn create_user(&self, request: &CreateRequest) -> AdminResult<UserRecord> {
        request.validate()?;
        debug!("Creating user");

        let created: LocalIdResponse = self.post("accounts", &request.to_payload()).await?;
        info!(uid = %created.local_id, "User created");
        self.get_user(&created.local_id).await
    }

    /// Apply `request` to the user and return the updated record.
    #[instrument(skip(self, request))]
    pub async fn update_user(&self, uid: &str, request: &UpdateRequest) -> AdminResult<UserRecord> {
        let uid = self.send_update(uid, request).await?;
        self.get_user(&uid).await
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, uid: &str) -> AdminResult<()> {
        validate::uid(uid)?;
        debug!("Deleting user");

        let _: Value = self.post("accounts:delete", &json!({ "localId": uid })).await?;
        info!("User deleted");
        Ok(())
    }

    /// Replace the user's custom claims; `None` removes them.
    #[instrument(skip(self, claims))]
    pub async fn set_custom_user_claims(
        &self,
        uid: &str,
        claims: Option<Map<String, Value>>,
    ) -> AdminResult<()> {
        let request = UpdateRequest::new().custom_claims(claims);
        self.send_update(uid, &request).await.map(|_| ())
    }

    /// Revoke every refresh token of the user issued before now.
    #[instrument(skip(self))]
    pub async fn revoke_refresh_tokens(&self, uid: &str) -> AdminResult<()> {
        let request = UpdateRequest::new().valid_since(Utc::now().timestamp());
        self.send_update(uid, &request).await?;
        info!("Refresh tokens revoked");
        Ok(())
    }

    /// Verify an ID token and return its claims.
    ///
    /// With `check_revoked`, the user is loaded as well: a disabled user
    /// yields `UserDisabled`, and a token authenticated before the user's
    /// tokens were revoked yields `RevokedIdToken`.
    #[instrument(skip(self, token))]
    pub async fn verify_id_token(&self, token: &str, check_revoked: bool) -> AdminResult<FirebaseClaims> {
        let claims = self.verifier.verify(token).await?;
        if !check_revoked {
            return Ok(claims);
        }

        let user = self.get_user(&claims.uid).await?;
        if user.disabled {
            debug!(uid = %claims.uid, "ID token belongs to a disabled user");
            return Err(AdminError::UserDisabled);
        }

        let auth_time_ms = claims
            .auth_time
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or_else(|| {
                AdminError::InvalidIdToken(
                    "Firebase ID token has an invalid \"auth_time\" claim".to_string(),
                )
            })?;
        if let Some(valid_after) = user.tokens_valid_after_timestamp {
            if auth_time_ms < valid_after {
                debug!(uid = %claims.uid, "ID token has been revoked");
                return Err(AdminError::RevokedIdToken);
            }
        }

        Ok(claims)
    }

    /// Mint a custom token for `uid` signed by the service account.
    #[instrument(skip(self, developer_claims))]
    pub fn create_custom_token(
        &self,
        uid: &str,
        developer_claims: Option<&Map<String, Value>>,
    ) -> AdminResult<String> {
        let key = self.config.credentials.as_ref().ok_or_else(|| {
            AdminError::Credentials("custom tokens require a service account key".to_string())
        })?;
        sign_custom_token(key, uid, developer_claims, self.config.tenant_id.as_deref())
    }

    async fn send_update(&self, uid: &str, request: &UpdateRequest) -> AdminResult<String> {
        validate::uid(uid)?;
        if request.is_empty() {
            return Err(AdminError::InvalidArgument(
                "update request must change at least one property".to_string(),
            ));
        }
        request.validate()?;
        debug!(uid, "Updating user");

        let updated: LocalIdResponse = self
            .post("accounts:update", &request.to_payload(uid)?)
            .await?;
        Ok(updated.local_id)
    }

    async fn lookup(&self, query: Value) -> AdminResult<UserRecord> {
        let response: LookupResponse = self.post("accounts:lookup", &query).await?;
        let raw = response
            .users
            .into_iter()
            .next()
            .ok_or(AdminError::UserNotFound)?;
        UserRecord::try_from(raw)
    }

    async fn post<T>(&self, action: &str, body: &Value) -> AdminResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.users_base_url(), action);
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T>(&self, response: reqwest::Response) -> AdminResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let err = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => AdminError::from_api(status.as_u16(), &parsed.error.message),
                Err(_) => AdminError::Api {
                    status: status.as_u16(),
                    code: "UNKNOWN".to_string(),
                    message: body,
                },
            };

            // Provider messages may echo emails or phone numbers; log the code only
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                error!(status = status.as_u16(), "Identity Toolkit authentication failed");
            } else {
                warn!(
                    status = status.as_u16(),
                    code = err.code(),
                    "Identity Toolkit API error"
                );
            }

            return Err(err);
        }

        response
            .json()
            .await
            .map_err(|e| AdminError::InvalidResponse(e.to_string()))
    }
}

fn build_http_client(config: &AdminConfig) -> AdminResult<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| AdminError::Config(format!("Failed to build HTTP client: {}", e)))
}
