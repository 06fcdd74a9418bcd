//! Create and update schemas
//!
//! Managers turn a create or update schema into a [`UserDict`] before
//! handing it to the user database. A "safe" dict is what an end user may
//! set on their own account; the superuser dict also carries the
//! privileged flags.

use crate::error::{UsersError, UsersResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map exchanged between managers and user databases.
pub type UserDict = Map<String, Value>;

/// Fields only a superuser may set.
pub const PRIVILEGED_FIELDS: &[&str] = &[
    "id",
    "is_superuser",
    "is_active",
    "is_verified",
    "oauth_accounts",
];

/// Conversion of a schema into the dict passed to the user database.
///
/// Unset (`None`) values never appear in the dict.
pub trait CreateUpdateDict: Serialize {
    /// Dict with privileged fields removed.
    fn create_update_dict(&self) -> UsersResult<UserDict> {
        let mut dict = self.create_update_dict_superuser()?;
        for field in PRIVILEGED_FIELDS {
            dict.remove(*field);
        }
        Ok(dict)
    }

    /// Dict with every field set on the schema except `id`.
    fn create_update_dict_superuser(&self) -> UsersResult<UserDict> {
        let value = serde_json::to_value(self)
            .map_err(|e| UsersError::Internal(format!("Schema serialization failed: {}", e)))?;

        let Value::Object(mut dict) = value else {
            return Err(UsersError::Internal(
                "Schema must serialize to an object".to_string(),
            ));
        };

        dict.retain(|_, v| !v.is_null());
        dict.remove("id");
        Ok(dict)
    }
}

/// A schema a manager can register a user from.
pub trait UserCreate: CreateUpdateDict + Send + Sync {
    /// Email of the new user, if any.
    fn email(&self) -> Option<&str>;

    /// Plain password of the new user, if any.
    fn password(&self) -> Option<&str>;
}

/// Base registration schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseUserCreate {
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Plain password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Whether the account is enabled
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Administrative rights
    #[serde(default)]
    pub is_superuser: bool,

    /// Verified contact channel
    #[serde(default)]
    pub is_verified: bool,
}

impl Default for BaseUserCreate {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
        }
    }
}

impl CreateUpdateDict for BaseUserCreate {}

impl UserCreate for BaseUserCreate {
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Base update schema. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaseUserUpdate {
    /// New email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// New plain password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Enable or disable the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    /// Grant or revoke administrative rights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,

    /// Mark the contact channel verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl CreateUpdateDict for BaseUserUpdate {}

/// Username/password pair submitted to a login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordCredentials {
    /// Username (usually the email)
    pub username: String,

    /// Plain password
    pub password: String,
}

fn default_true() -> bool {
    true
}
