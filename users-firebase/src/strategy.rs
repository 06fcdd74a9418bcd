//! Firebase ID token strategy
//!
//! Reads users from Firebase ID tokens issued to client SDKs. Tokens are
//! always checked for revocation, so a signed-out or disabled user is
//! rejected even while their token has not expired.

use crate::error::provider_error;
use crate::user::FirebaseUser;
use async_trait::async_trait;
use firebase_admin::{AdminError, AuthClient};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};
use users_core::{Strategy, UserManager, UsersError, UsersResult};

/// Token strategy verifying Firebase ID tokens.
#[derive(Debug, Clone)]
pub struct FirebaseIdTokenStrategy {
    client: Arc<AuthClient>,
    developer_claims: Option<Map<String, Value>>,
}

impl FirebaseIdTokenStrategy {
    pub fn new(client: Arc<AuthClient>) -> Self {
        Self {
            client,
            developer_claims: None,
        }
    }

    /// Attach `claims` to the custom tokens this strategy writes.
    pub fn with_developer_claims(mut self, claims: Map<String, Value>) -> Self {
        self.developer_claims = Some(claims);
        self
    }
}

#[async_trait]
impl<M> Strategy<M> for FirebaseIdTokenStrategy
where
    M: UserManager<User = FirebaseUser>,
{
    #[instrument(skip_all)]
    async fn read_token(&self, token: Option<&str>, manager: &M) -> UsersResult<Option<FirebaseUser>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let claims = match self.client.verify_id_token(token, true).await {
            Ok(claims) => claims,
            Err(
                e @ (AdminError::ExpiredIdToken
                | AdminError::RevokedIdToken
                | AdminError::UserDisabled),
            ) => {
                debug!(error = %e, "ID token refused");
                return Err(UsersError::Forbidden(e.to_string()));
            }
            Err(e) if e.is_invalid_id_token() => {
                debug!(error = %e, "Invalid ID token");
                return Ok(None);
            }
            Err(AdminError::UserNotFound) => return Ok(None),
            Err(e) => return Err(provider_error(e)),
        };

        let id = manager.parse_id(&claims.uid)?;
        match manager.get(&id).await {
            Ok(user) => Ok(Some(user)),
            Err(UsersError::UserNotExists) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// A Firebase custom token for `user`, exchanged for an ID token by a
    /// client SDK.
    #[instrument(skip_all, fields(uid = %user.id))]
    async fn write_token(&self, user: &FirebaseUser) -> UsersResult<String> {
        self.client
            .create_custom_token(user.id.as_str(), self.developer_claims.as_ref())
            .map_err(provider_error)
    }

    /// Revokes the user's refresh tokens; ID tokens already issued fail
    /// the revocation check from then on.
    #[instrument(skip_all, fields(uid = %user.id))]
    async fn destroy_token(&self, _token: &str, user: &FirebaseUser) -> UsersResult<()> {
        self.client
            .revoke_refresh_tokens(user.id.as_str())
            .await
            .map_err(provider_error)
    }
}
