//! The user model seen by managers, strategies and the authenticator.

use std::fmt::Debug;

/// Read access to the fields every user backend must provide.
///
/// Backends wrap whatever record their store returns and expose it through
/// this trait, so access checks do not depend on the storage format.
pub trait UserProtocol: Send + Sync {
    /// User identifier type.
    type Id: Clone + Debug + Send + Sync;

    /// Unique user identifier.
    fn id(&self) -> &Self::Id;

    /// Email address, empty when the user has none.
    fn email(&self) -> &str;

    /// Password hash, empty when the backend does not expose it.
    fn hashed_password(&self) -> &str;

    /// Whether the user may sign in.
    fn is_active(&self) -> bool;

    /// Whether the user proved ownership of a contact channel.
    fn is_verified(&self) -> bool;

    /// Whether the user has administrative rights.
    fn is_superuser(&self) -> bool;
}
