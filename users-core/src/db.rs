//! User database seam.

use crate::error::UsersResult;
use crate::models::UserProtocol;
use crate::schemas::UserDict;
use async_trait::async_trait;

/// Storage backend for users.
///
/// Lookups return `Ok(None)` for a missing user; errors are reserved for
/// failures of the store itself.
#[async_trait]
pub trait UserDatabase: Send + Sync {
    /// User type produced by this database.
    type User: UserProtocol;

    /// Get a user by ID.
    async fn get(&self, id: &<Self::User as UserProtocol>::Id) -> UsersResult<Option<Self::User>>;

    /// Get a user by email.
    async fn get_by_email(&self, email: &str) -> UsersResult<Option<Self::User>>;

    /// Create a user from a create dict.
    async fn create(&self, create_dict: UserDict) -> UsersResult<Self::User>;

    /// Update a user with an update dict.
    async fn update(&self, user: &Self::User, update_dict: UserDict) -> UsersResult<Self::User>;

    /// Delete a user.
    async fn delete(&self, user: &Self::User) -> UsersResult<()>;
}
