//! Translation of Firebase admin errors into user-management errors.

use firebase_admin::AdminError;
use tracing::warn;
use users_core::UsersError;
use validator::ValidationErrors;

/// Map an admin API error onto [`UsersError`].
///
/// Uniqueness conflicts become `UserAlreadyExists`, a missing user becomes
/// `UserNotExists`, rejected arguments become `Validation`, and everything
/// else is a `Provider` failure.
pub fn provider_error(err: AdminError) -> UsersError {
    match err {
        e if e.is_conflict() => UsersError::UserAlreadyExists,
        AdminError::UserNotFound => UsersError::UserNotExists,
        AdminError::InvalidArgument(message) => UsersError::Validation(message),
        other => {
            warn!(error = %other, "Firebase Authentication call failed");
            UsersError::Provider(other.to_string())
        }
    }
}

/// Flatten schema validation errors into one `Validation` error.
pub fn validation_error(errors: ValidationErrors) -> UsersError {
    UsersError::Validation(errors.to_string())
}
