//! Error types for user management operations
//!
//! This module defines the errors raised by user databases, managers,
//! token strategies and the authenticator, together with the HTTP status
//! and error code each one maps to.

use thiserror::Error;

/// User management error types.
///
/// These errors cover lookups, registration, updates, token reading and
/// access checks. Identity provider failures that have no better mapping
/// surface as [`UsersError::Provider`].
#[derive(Debug, Error)]
pub enum UsersError {
    /// A user with the same identifying data already exists
    #[error("User already exists")]
    UserAlreadyExists,

    /// The requested user does not exist
    #[error("User does not exist")]
    UserNotExists,

    /// The user is disabled
    #[error("User is inactive")]
    UserInactive,

    /// The user is already verified
    #[error("User is already verified")]
    UserAlreadyVerified,

    /// The user ID could not be parsed
    #[error("Invalid user ID: {0}")]
    InvalidId(String),

    /// The password was rejected by the password policy
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Email verification token is invalid
    #[error("Invalid verification token")]
    InvalidVerifyToken,

    /// Password reset token is invalid
    #[error("Invalid reset password token")]
    InvalidResetPasswordToken,

    /// No authenticated user
    #[error("Unauthorized")]
    Unauthorized,

    /// The operation is not allowed for this user or backend
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Create or update data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend does not implement this operation
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Identity provider error
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for user management operations.
pub type UsersResult<T> = Result<T, UsersError>;

impl UsersError {
    /// Build a [`UsersError::Forbidden`] with the given detail.
    pub fn forbidden(detail: impl Into<String>) -> Self {
        UsersError::Forbidden(detail.into())
    }

    /// Check if this error should be logged at error level.
    ///
    /// Lookup misses, conflicts and rejected tokens are expected and
    /// should not be logged as errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            UsersError::Provider(_) | UsersError::Internal(_) | UsersError::NotSupported(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UsersError::UserAlreadyExists
            | UsersError::UserAlreadyVerified
            | UsersError::InvalidPassword(_)
            | UsersError::InvalidVerifyToken
            | UsersError::InvalidResetPasswordToken
            | UsersError::UserInactive
            | UsersError::InvalidId(_) => 400,

            UsersError::Unauthorized => 401,
            UsersError::Forbidden(_) => 403,
            UsersError::UserNotExists => 404,
            UsersError::Validation(_) => 422,

            UsersError::NotSupported(_) => 501,
            UsersError::Provider(_) | UsersError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            UsersError::UserAlreadyExists => "REGISTER_USER_ALREADY_EXISTS",
            UsersError::UserNotExists => "USER_NOT_EXISTS",
            UsersError::UserInactive => "USER_INACTIVE",
            UsersError::UserAlreadyVerified => "VERIFY_USER_ALREADY_VERIFIED",
            UsersError::InvalidId(_) => "INVALID_ID",
            UsersError::InvalidPassword(_) => "INVALID_PASSWORD",
            UsersError::InvalidVerifyToken => "VERIFY_USER_BAD_TOKEN",
            UsersError::InvalidResetPasswordToken => "RESET_PASSWORD_BAD_TOKEN",
            UsersError::Unauthorized => "UNAUTHORIZED",
            UsersError::Forbidden(_) => "FORBIDDEN",
            UsersError::Validation(_) => "VALIDATION_ERROR",
            UsersError::NotSupported(_) => "NOT_SUPPORTED",
            UsersError::Provider(_) => "IDENTITY_PROVIDER_ERROR",
            UsersError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
