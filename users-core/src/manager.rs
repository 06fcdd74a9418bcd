//! User manager seam and lifecycle hooks
//!
//! A manager owns the business rules around a [`UserDatabase`](crate::UserDatabase):
//! duplicate checks, password policy, safe versus privileged updates, and
//! the verification and password-reset flows. Applications customize it
//! through [`UserHooks`].

use crate::error::UsersResult;
use crate::models::UserProtocol;
use crate::schemas::{CreateUpdateDict, PasswordCredentials, UserCreate, UserDict};
use async_trait::async_trait;

/// Callbacks invoked by a manager around user lifecycle events.
///
/// Every method has a no-op default.
#[async_trait]
pub trait UserHooks<U: Send + Sync>: Send + Sync {
    /// Reject a password before a user is created with it.
    async fn validate_password(&self, _password: &str, _email: Option<&str>) -> UsersResult<()> {
        Ok(())
    }

    /// Called after a user registered.
    async fn on_after_register(&self, _user: &U) {}

    /// Called after a user was updated with `update_dict`.
    async fn on_after_update(&self, _user: &U, _update_dict: &UserDict) {}

    /// Called before a user is deleted.
    async fn on_before_delete(&self, _user: &U) {}

    /// Called after a user was deleted.
    async fn on_after_delete(&self, _user: &U) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl<U: Send + Sync> UserHooks<U> for NoopHooks {}

/// User management operations used by routers and token strategies.
#[async_trait]
pub trait UserManager: Send + Sync {
    /// Managed user type.
    type User: UserProtocol<Id = Self::Id>;

    /// User identifier type.
    type Id: Clone + std::fmt::Debug + Send + Sync;

    /// Registration schema.
    type Create: UserCreate;

    /// Update schema.
    type Update: CreateUpdateDict + Send + Sync;

    /// Parse a raw identifier (from a token or a path) into an ID.
    fn parse_id(&self, value: &str) -> UsersResult<Self::Id>;

    /// Get a user by ID, failing with `UserNotExists` when absent.
    async fn get(&self, id: &Self::Id) -> UsersResult<Self::User>;

    /// Get a user by email, failing with `UserNotExists` when absent.
    async fn get_by_email(&self, email: &str) -> UsersResult<Self::User>;

    /// Register a new user.
    ///
    /// With `safe` set, privileged fields of the schema are ignored.
    async fn create(&self, user_create: &Self::Create, safe: bool) -> UsersResult<Self::User>;

    /// Update a user.
    ///
    /// With `safe` set, privileged fields of the schema are ignored.
    async fn update(
        &self,
        user_update: &Self::Update,
        user: &Self::User,
        safe: bool,
    ) -> UsersResult<Self::User>;

    /// Delete a user.
    async fn delete(&self, user: &Self::User) -> UsersResult<()>;

    /// Start the email verification flow.
    async fn request_verify(&self, user: &Self::User) -> UsersResult<()>;

    /// Complete the email verification flow.
    async fn verify(&self, token: &str) -> UsersResult<Self::User>;

    /// Start the password reset flow.
    async fn forgot_password(&self, user: &Self::User) -> UsersResult<()>;

    /// Complete the password reset flow.
    async fn reset_password(&self, token: &str, password: &str) -> UsersResult<Self::User>;

    /// Check a username/password pair.
    async fn authenticate(
        &self,
        credentials: &PasswordCredentials,
    ) -> UsersResult<Option<Self::User>>;
}
