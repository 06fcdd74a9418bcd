//! User manager for Firebase users
//!
//! Registration, updates and deletion go through the Firebase user
//! database. Verification, password reset and password login happen in a
//! Firebase client SDK, so those operations are refused here.

use crate::database::FirebaseUserDatabase;
use crate::schemas::{CreateFirebaseUser, UpdateFirebaseUser};
use crate::user::{FirebaseUser, Uid};
use async_trait::async_trait;
use firebase_admin::AuthClient;
use std::sync::Arc;
use tracing::{info, instrument};
use users_core::{
    CreateUpdateDict, NoopHooks, PasswordCredentials, UserDatabase, UserHooks, UserManager,
    UsersError, UsersResult,
};

/// Detail of the error returned for client-SDK-only operations.
pub const CLIENT_SDK_REQUIRED: &str =
    "This operation is not allowed, please use a Firebase Client SDK.";

fn client_sdk_required() -> UsersError {
    UsersError::forbidden(CLIENT_SDK_REQUIRED)
}

/// Manages Firebase users, running `H` around lifecycle events.
#[derive(Debug, Clone)]
pub struct FirebaseUserManager<H = NoopHooks> {
    db: FirebaseUserDatabase,
    hooks: H,
}

impl FirebaseUserManager<NoopHooks> {
    pub fn new(db: FirebaseUserDatabase) -> Self {
        Self::with_hooks(db, NoopHooks)
    }

    /// Manager over a database built from `client`.
    pub fn from_client(client: Arc<AuthClient>) -> Self {
        Self::new(FirebaseUserDatabase::new(client))
    }
}

impl<H> FirebaseUserManager<H> {
    pub fn with_hooks(db: FirebaseUserDatabase, hooks: H) -> Self {
        Self { db, hooks }
    }

    pub fn db(&self) -> &FirebaseUserDatabase {
        &self.db
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

#[async_trait]
impl<H> UserManager for FirebaseUserManager<H>
where
    H: UserHooks<FirebaseUser>,
{
    type User = FirebaseUser;
    type Id = Uid;
    type Create = CreateFirebaseUser;
    type Update = UpdateFirebaseUser;

    fn parse_id(&self, value: &str) -> UsersResult<Uid> {
        if value.is_empty() {
            return Err(UsersError::InvalidId("user ID must not be empty".to_string()));
        }
        Ok(Uid::new(value))
    }

    async fn get(&self, id: &Uid) -> UsersResult<FirebaseUser> {
        self.db.get(id).await?.ok_or(UsersError::UserNotExists)
    }

    async fn get_by_email(&self, email: &str) -> UsersResult<FirebaseUser> {
        self.db
            .get_by_email(email)
            .await?
            .ok_or(UsersError::UserNotExists)
    }

    #[instrument(skip(self, user_create))]
    async fn create(&self, user_create: &CreateFirebaseUser, safe: bool) -> UsersResult<FirebaseUser> {
        if let Some(password) = user_create.password.as_deref() {
            self.hooks
                .validate_password(password, user_create.email.as_deref())
                .await?;
        }

        if let Some(email) = user_create.email.as_deref() {
            if self.db.get_by_email(email).await?.is_some() {
                return Err(UsersError::UserAlreadyExists);
            }
        }

        let user_dict = if safe {
            user_create.create_update_dict()?
        } else {
            user_create.create_update_dict_superuser()?
        };

        let created = self.db.create(user_dict).await?;
        info!(uid = %created.id, "User registered");

        self.hooks.on_after_register(&created).await;
        Ok(created)
    }

    #[instrument(skip(self, user_update, user), fields(uid = %user.id))]
    async fn update(
        &self,
        user_update: &UpdateFirebaseUser,
        user: &FirebaseUser,
        safe: bool,
    ) -> UsersResult<FirebaseUser> {
        let user_dict = if safe {
            user_update.create_update_dict()?
        } else {
            user_update.create_update_dict_superuser()?
        };

        let updated = self.db.update(user, user_dict.clone()).await?;
        self.hooks.on_after_update(&updated, &user_dict).await;
        Ok(updated)
    }

    #[instrument(skip(self, user), fields(uid = %user.id))]
    async fn delete(&self, user: &FirebaseUser) -> UsersResult<()> {
        self.hooks.on_before_delete(user).await;
        self.db.delete(user).await?;
        info!("User deleted");
        self.hooks.on_after_delete(user).await;
        Ok(())
    }

    async fn request_verify(&self, _user: &FirebaseUser) -> UsersResult<()> {
        Err(client_sdk_required())
    }

    async fn verify(&self, _token: &str) -> UsersResult<FirebaseUser> {
        Err(client_sdk_required())
    }

    async fn forgot_password(&self, _user: &FirebaseUser) -> UsersResult<()> {
        Err(client_sdk_required())
    }

    async fn reset_password(&self, _token: &str, _password: &str) -> UsersResult<FirebaseUser> {
        Err(client_sdk_required())
    }

    async fn authenticate(
        &self,
        _credentials: &PasswordCredentials,
    ) -> UsersResult<Option<FirebaseUser>> {
        Err(client_sdk_required())
    }
}
