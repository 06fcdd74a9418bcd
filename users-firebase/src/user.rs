//! The Firebase user model.

use firebase_admin::UserRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use users_core::UserProtocol;

/// Firebase user ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Uid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl From<&str> for Uid {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

/// Decides whether a user record belongs to a superuser.
pub type IsSuperuser = Arc<dyn Fn(&UserRecord) -> bool + Send + Sync>;

/// Superuser when the custom claim `name` is `true`.
pub fn superuser_claim(name: impl Into<String>) -> IsSuperuser {
    let name = name.into();
    Arc::new(move |record: &UserRecord| {
        record
            .custom_claims
            .as_ref()
            .and_then(|claims| claims.get(&name))
            .map_or(false, |value| value == &Value::Bool(true))
    })
}

/// A Firebase Authentication user seen through [`UserProtocol`].
#[derive(Debug, Clone, PartialEq)]
pub struct FirebaseUser {
    pub id: Uid,

    /// Primary email, empty when the user has none
    pub email: String,

    /// Not disabled in Firebase
    pub is_active: bool,

    /// Email verified, or a phone number is linked
    pub is_verified: bool,

    pub is_superuser: bool,

    pub phone_number: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Always empty; Firebase does not expose password hashes
    pub hashed_password: String,

    /// The record the user was built from
    pub record: UserRecord,
}

impl FirebaseUser {
    /// Wrap a user record.
    ///
    /// A phone number counts as verified since Firebase verifies it when
    /// it is linked. Without a predicate no user is a superuser.
    pub fn from_record(record: UserRecord, is_superuser: Option<&IsSuperuser>) -> Self {
        let is_superuser = is_superuser.map_or(false, |predicate| predicate(&record));
        let has_phone = record
            .phone_number
            .as_deref()
            .map_or(false, |phone| !phone.is_empty());

        Self {
            id: Uid::new(record.uid.clone()),
            email: record.email.clone().unwrap_or_default(),
            is_active: !record.disabled,
            is_verified: record.email_verified || has_phone,
            is_superuser,
            phone_number: record.phone_number.clone(),
            name: record.display_name.clone(),
            hashed_password: String::new(),
            record,
        }
    }
}

impl UserProtocol for FirebaseUser {
    type Id = Uid;

    fn id(&self) -> &Uid {
        &self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_verified(&self) -> bool {
        self.is_verified
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}
