//! Argument checks applied before any request leaves the client.

use crate::error::{AdminError, AdminResult};
use serde_json::{Map, Value};

/// Claim names that custom claims may not use.
pub const RESERVED_CLAIMS: &[&str] = &[
    "acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "firebase", "iat",
    "iss", "jti", "nbf", "nonce", "sub",
];

/// Largest serialized size of a user's custom claims, in bytes.
pub const MAX_CLAIMS_PAYLOAD_SIZE: usize = 1000;

/// Longest accepted uid, in characters.
pub const MAX_UID_LENGTH: usize = 128;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

fn invalid(message: impl Into<String>) -> AdminError {
    AdminError::InvalidArgument(message.into())
}

/// uid must be 1 to 128 characters.
pub fn uid(uid: &str) -> AdminResult<()> {
    let len = uid.chars().count();
    if len == 0 || len > MAX_UID_LENGTH {
        return Err(invalid(format!(
            "uid must be a non-empty string with at most {} characters",
            MAX_UID_LENGTH
        )));
    }
    Ok(())
}

/// Exactly one `@` with non-empty local and domain parts.
pub fn email(email: &str) -> AdminResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid("email must be a valid email address")),
    }
}

/// Whether `phone` is E.164: `+` followed by 7 to 15 digits.
pub fn is_valid_e164(phone: &str) -> bool {
    match phone.strip_prefix('+') {
        Some(digits) => {
            (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Phone number must be E.164.
pub fn phone_number(phone: &str) -> AdminResult<()> {
    if !is_valid_e164(phone) {
        return Err(invalid("phone number must be a valid E.164 string"));
    }
    Ok(())
}

/// Password must be at least 6 characters.
pub fn password(password: &str) -> AdminResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Photo URL must parse as an absolute URL.
pub fn photo_url(photo_url: &str) -> AdminResult<()> {
    url::Url::parse(photo_url)
        .map(|_| ())
        .map_err(|e| invalid(format!("photo URL must be a valid URL: {}", e)))
}

/// Custom claims must avoid reserved names and fit the payload limit.
pub fn custom_claims(claims: &Map<String, Value>) -> AdminResult<()> {
    reserved_claims(claims)?;

    let size = serde_json::to_string(claims)
        .map_err(|e| invalid(format!("custom claims are not serializable: {}", e)))?
        .len();
    if size > MAX_CLAIMS_PAYLOAD_SIZE {
        return Err(invalid(format!(
            "custom claims payload must not exceed {} bytes",
            MAX_CLAIMS_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Claims must not use a reserved name.
pub fn reserved_claims(claims: &Map<String, Value>) -> AdminResult<()> {
    if let Some(key) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
        return Err(invalid(format!("claim {:?} is reserved and cannot be set", key)));
    }
    Ok(())
}

/// Mask a phone number for logging, keeping the last 4 digits.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", visible)
}

/// Mask an email for logging, keeping the domain.
pub fn mask_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((_, domain)) => format!("***@{}", domain),
        None => "***".to_string(),
    }
}
