//! User database backed by Firebase Authentication.

use crate::error::provider_error;
use crate::schemas::{CreateFirebaseUser, UpdateFirebaseUser};
use crate::user::{FirebaseUser, IsSuperuser, Uid};
use async_trait::async_trait;
use firebase_admin::{AdminError, AuthClient, UserRecord};
use std::sync::Arc;
use tracing::{debug, instrument};
use users_core::{UserDatabase, UserDict, UsersResult};

/// Firebase Authentication as a [`UserDatabase`].
#[derive(Clone)]
pub struct FirebaseUserDatabase {
    client: Arc<AuthClient>,
    is_superuser: Option<IsSuperuser>,
}

impl std::fmt::Debug for FirebaseUserDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseUserDatabase")
            .field("client", &self.client)
            .field("is_superuser", &self.is_superuser.is_some())
            .finish()
    }
}

impl FirebaseUserDatabase {
    pub fn new(client: Arc<AuthClient>) -> Self {
        Self {
            client,
            is_superuser: None,
        }
    }

    /// Decide superusers with `is_superuser`.
    pub fn with_superuser(mut self, is_superuser: IsSuperuser) -> Self {
        self.is_superuser = Some(is_superuser);
        self
    }

    pub fn client(&self) -> &Arc<AuthClient> {
        &self.client
    }

    fn map_user(&self, record: UserRecord) -> FirebaseUser {
        FirebaseUser::from_record(record, self.is_superuser.as_ref())
    }

    fn found(&self, result: Result<UserRecord, AdminError>) -> UsersResult<Option<FirebaseUser>> {
        match result {
            Ok(record) => Ok(Some(self.map_user(record))),
            Err(AdminError::UserNotFound) => Ok(None),
            Err(e) => Err(provider_error(e)),
        }
    }
}

#[async_trait]
impl UserDatabase for FirebaseUserDatabase {
    type User = FirebaseUser;

    #[instrument(skip(self))]
    async fn get(&self, id: &Uid) -> UsersResult<Option<FirebaseUser>> {
        self.found(self.client.get_user(id.as_str()).await)
    }

    #[instrument(skip(self, email))]
    async fn get_by_email(&self, email: &str) -> UsersResult<Option<FirebaseUser>> {
        self.found(self.client.get_user_by_email(email).await)
    }

    #[instrument(skip(self, create_dict))]
    async fn create(&self, create_dict: UserDict) -> UsersResult<FirebaseUser> {
        let data = CreateFirebaseUser::from_dict(create_dict)?;

        let mut record = self
            .client
            .create_user(&data.to_create_request())
            .await
            .map_err(provider_error)?;

        if let Some(claims) = data.firebase.custom_claims {
            debug!(uid = %record.uid, "Setting custom claims on new user");
            self.client
                .set_custom_user_claims(&record.uid, Some(claims.clone()))
                .await
                .map_err(provider_error)?;
            record.custom_claims = Some(claims);
        }

        Ok(self.map_user(record))
    }

    #[instrument(skip(self, user, update_dict), fields(uid = %user.id))]
    async fn update(&self, user: &FirebaseUser, update_dict: UserDict) -> UsersResult<FirebaseUser> {
        let request = UpdateFirebaseUser::from_dict(update_dict)?.to_update_request();
        if request.is_empty() {
            debug!("Nothing to update");
            return Ok(user.clone());
        }

        let record = self
            .client
            .update_user(user.id.as_str(), &request)
            .await
            .map_err(provider_error)?;
        Ok(self.map_user(record))
    }

    #[instrument(skip(self, user), fields(uid = %user.id))]
    async fn delete(&self, user: &FirebaseUser) -> UsersResult<()> {
        self.client
            .delete_user(user.id.as_str())
            .await
            .map_err(provider_error)
    }
}
