//! Error types for Firebase Authentication admin operations
//!
//! This module defines the errors raised while managing users through the
//! Identity Toolkit API, verifying ID tokens, and minting custom tokens.

use thiserror::Error;

/// Firebase admin error types.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No user record matches the lookup
    #[error("No user record found for the given identifier")]
    UserNotFound,

    /// Another user already uses the email
    #[error("The user with the provided email already exists")]
    EmailAlreadyExists,

    /// Another user already uses the phone number
    #[error("The user with the provided phone number already exists")]
    PhoneNumberAlreadyExists,

    /// Another user already uses the uid
    #[error("The user with the provided uid already exists")]
    UidAlreadyExists,

    /// ID token failed verification
    #[error("Invalid ID token: {0}")]
    InvalidIdToken(String),

    /// ID token is past its expiry
    #[error("The Firebase ID token is expired")]
    ExpiredIdToken,

    /// ID token was issued before the user's tokens were revoked
    #[error("The Firebase ID token has been revoked")]
    RevokedIdToken,

    /// The user owning the token is disabled
    #[error("The user record is disabled")]
    UserDisabled,

    /// Public signing keys could not be fetched
    #[error("Failed to fetch public key certificates: {0}")]
    CertificateFetch(String),

    /// A request argument was rejected before or by the API
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// API returned an error response
    #[error("API error ({status}) {code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error code (e.g. `TOO_MANY_ATTEMPTS_TRY_LATER`)
        code: String,
        /// Full provider message
        message: String,
    },

    /// Response could not be decoded
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Service account credentials are unusable
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Result type for Firebase admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// Whether this error rejects an ID token (including expiry and revocation).
    pub fn is_invalid_id_token(&self) -> bool {
        matches!(
            self,
            AdminError::InvalidIdToken(_) | AdminError::ExpiredIdToken | AdminError::RevokedIdToken
        )
    }

    /// Whether this error reports a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AdminError::EmailAlreadyExists
                | AdminError::PhoneNumberAlreadyExists
                | AdminError::UidAlreadyExists
        )
    }

    /// Stable code for this error, free of user data.
    pub fn code(&self) -> &str {
        match self {
            AdminError::UserNotFound => "USER_NOT_FOUND",
            AdminError::EmailAlreadyExists => "EMAIL_EXISTS",
            AdminError::PhoneNumberAlreadyExists => "PHONE_NUMBER_EXISTS",
            AdminError::UidAlreadyExists => "DUPLICATE_LOCAL_ID",
            AdminError::InvalidIdToken(_) => "INVALID_ID_TOKEN",
            AdminError::ExpiredIdToken => "TOKEN_EXPIRED",
            AdminError::RevokedIdToken => "TOKEN_REVOKED",
            AdminError::UserDisabled => "USER_DISABLED",
            AdminError::CertificateFetch(_) => "CERTIFICATE_FETCH_FAILED",
            AdminError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AdminError::Api { code, .. } => code,
            AdminError::InvalidResponse(_) => "INVALID_RESPONSE",
            AdminError::Credentials(_) => "INVALID_CREDENTIALS",
            AdminError::Config(_) => "INVALID_CONFIG",
            AdminError::RequestFailed(_) => "REQUEST_FAILED",
        }
    }

    /// Map an Identity Toolkit error body to an error.
    ///
    /// The provider message starts with an error code, optionally followed
    /// by `" : "` and a detail (e.g. `"INVALID_EMAIL : bad format"`).
    pub fn from_api(status: u16, message: &str) -> Self {
        let code = message
            .split(|c: char| c == ':' || c.is_whitespace())
            .next()
            .unwrap_or_default()
            .to_string();

        match code.as_str() {
            "USER_NOT_FOUND" => AdminError::UserNotFound,
            "EMAIL_EXISTS" => AdminError::EmailAlreadyExists,
            "PHONE_NUMBER_EXISTS" => AdminError::PhoneNumberAlreadyExists,
            "DUPLICATE_LOCAL_ID" => AdminError::UidAlreadyExists,
            "USER_DISABLED" => AdminError::UserDisabled,
            "INVALID_ID_TOKEN" => AdminError::InvalidIdToken(message.to_string()),
            "TOKEN_EXPIRED" => AdminError::ExpiredIdToken,
            c if c.starts_with("INVALID_") || c.starts_with("MISSING_") => {
                AdminError::InvalidArgument(message.to_string())
            }
            _ => AdminError::Api {
                status,
                code,
                message: message.to_string(),
            },
        }
    }
}
