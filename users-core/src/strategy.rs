//! Token strategy seam.

use crate::error::UsersResult;
use crate::manager::UserManager;
use async_trait::async_trait;

/// Turns tokens into users and back.
///
/// `read_token` returns `Ok(None)` for a token that does not identify a
/// user; errors are for tokens that must be refused outright (expired,
/// revoked) and for backend failures.
#[async_trait]
pub trait Strategy<M: UserManager>: Send + Sync {
    /// Resolve the user a token belongs to.
    async fn read_token(&self, token: Option<&str>, manager: &M) -> UsersResult<Option<M::User>>;

    /// Issue a token for a user.
    async fn write_token(&self, user: &M::User) -> UsersResult<String>;

    /// Invalidate a token of a user.
    async fn destroy_token(&self, token: &str, user: &M::User) -> UsersResult<()>;
}
