//! Authentication backends and current-user resolution
//!
//! An [`AuthenticationBackend`] pairs a transport with a token strategy.
//! [`AuthenticationBackend::current_user`] resolves the caller from a
//! request's `Authorization` header and enforces [`UserRequirements`].

use crate::error::{UsersError, UsersResult};
use crate::manager::UserManager;
use crate::models::UserProtocol;
use crate::strategy::Strategy;
use crate::transport::{BearerResponse, BearerTransport};
use tracing::debug;

/// Conditions the current user must meet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRequirements {
    /// User must be active
    pub active: bool,

    /// User must be verified
    pub verified: bool,

    /// User must be a superuser
    pub superuser: bool,

    /// Return `None` instead of failing when no user matches
    pub optional: bool,
}

impl UserRequirements {
    /// Require an active user.
    pub fn active() -> Self {
        Self {
            active: true,
            ..Default::default()
        }
    }

    /// Also require a verified user.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Also require a superuser.
    pub fn superuser(mut self) -> Self {
        self.superuser = true;
        self
    }

    /// Return `None` instead of failing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A named transport/strategy pair.
#[derive(Debug, Clone)]
pub struct AuthenticationBackend<S> {
    name: String,
    transport: BearerTransport,
    strategy: S,
}

impl<S> AuthenticationBackend<S> {
    /// Create a backend.
    pub fn new(name: impl Into<String>, transport: BearerTransport, strategy: S) -> Self {
        Self {
            name: name.into(),
            transport,
            strategy,
        }
    }

    /// Backend name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token transport.
    pub fn transport(&self) -> &BearerTransport {
        &self.transport
    }

    /// Token strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Issue a token for `user` and wrap it in a login response.
    pub async fn login<M>(&self, user: &M::User) -> UsersResult<BearerResponse>
    where
        M: UserManager,
        S: Strategy<M>,
    {
        let token = self.strategy.write_token(user).await?;
        Ok(self.transport.login_response(token))
    }

    /// Invalidate `token` for `user`.
    pub async fn logout<M>(&self, token: &str, user: &M::User) -> UsersResult<()>
    where
        M: UserManager,
        S: Strategy<M>,
    {
        self.strategy.destroy_token(token, user).await
    }

    /// Resolve the user behind an `Authorization` header.
    ///
    /// No user yields `Unauthorized`; an inactive user also yields
    /// `Unauthorized`; a user failing the verified or superuser
    /// requirement yields `Forbidden`. With `optional` set, each of those
    /// cases returns `Ok(None)` instead.
    pub async fn current_user<M>(
        &self,
        authorization: Option<&str>,
        manager: &M,
        requirements: UserRequirements,
    ) -> UsersResult<Option<M::User>>
    where
        M: UserManager,
        S: Strategy<M>,
    {
        let token = self.transport.token(authorization);
        let user = self.strategy.read_token(token, manager).await?;

        let rejection = match &user {
            None => Some(UsersError::Unauthorized),
            Some(user) if requirements.active && !user.is_active() => {
                Some(UsersError::Unauthorized)
            }
            Some(user) if requirements.verified && !user.is_verified() => {
                Some(UsersError::forbidden("User is not verified"))
            }
            Some(user) if requirements.superuser && !user.is_superuser() => {
                Some(UsersError::forbidden("User is not a superuser"))
            }
            Some(_) => None,
        };

        match rejection {
            None => Ok(user),
            Some(err) => {
                debug!(backend = %self.name, error = %err, "Current user rejected");
                if requirements.optional {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}
