//! User records and the requests that create or change them.

use crate::error::{AdminError, AdminResult};
use crate::validate;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Provider ID of phone sign-in.
const PHONE_PROVIDER_ID: &str = "phone";

/// A Firebase Authentication user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID
    pub uid: String,

    /// Primary email
    pub email: Option<String>,

    /// Whether the primary email is verified
    pub email_verified: bool,

    /// Display name
    pub display_name: Option<String>,

    /// Photo URL
    pub photo_url: Option<String>,

    /// Primary phone number (E.164)
    pub phone_number: Option<String>,

    /// Whether the user is disabled
    pub disabled: bool,

    /// Custom claims set through the admin API
    pub custom_claims: Option<Map<String, Value>>,

    /// Tokens issued before this time (milliseconds since epoch) are revoked
    pub tokens_valid_after_timestamp: Option<i64>,

    /// Account timestamps
    pub metadata: UserMetadata,

    /// Linked sign-in providers
    pub provider_data: Vec<UserInfo>,

    /// Tenant the user belongs to
    pub tenant_id: Option<String>,
}

/// Account timestamps, in milliseconds since epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub creation_timestamp: Option<i64>,
    pub last_sign_in_timestamp: Option<i64>,
    pub last_refresh_timestamp: Option<i64>,
}

/// A provider linked to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Provider ID (e.g. `google.com`, `phone`)
    pub provider_id: String,

    /// User ID at the provider
    #[serde(rename = "rawId")]
    pub uid: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,
}

/// User as returned by `accounts:lookup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawUserRecord {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    custom_attributes: Option<String>,
    #[serde(default)]
    valid_since: Option<Value>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default)]
    last_login_at: Option<Value>,
    #[serde(default)]
    last_refresh_at: Option<String>,
    #[serde(default)]
    provider_user_info: Vec<UserInfo>,
    #[serde(default)]
    tenant_id: Option<String>,
}

impl TryFrom<RawUserRecord> for UserRecord {
    type Error = AdminError;

    fn try_from(raw: RawUserRecord) -> AdminResult<Self> {
        let custom_claims = match raw.custom_attributes.as_deref() {
            None | Some("") => None,
            Some(attributes) => {
                let claims: Map<String, Value> = serde_json::from_str(attributes).map_err(|e| {
                    AdminError::InvalidResponse(format!("customAttributes is not an object: {}", e))
                })?;
                Some(claims)
            }
        };

        let last_refresh_timestamp = raw
            .last_refresh_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| at.timestamp_millis());

        Ok(Self {
            uid: raw.local_id,
            email: raw.email,
            email_verified: raw.email_verified,
            display_name: raw.display_name,
            photo_url: raw.photo_url,
            phone_number: raw.phone_number,
            disabled: raw.disabled,
            custom_claims,
            tokens_valid_after_timestamp: raw
                .valid_since
                .as_ref()
                .and_then(integer)
                .map(|secs| secs * 1000),
            metadata: UserMetadata {
                creation_timestamp: raw.created_at.as_ref().and_then(integer),
                last_sign_in_timestamp: raw.last_login_at.as_ref().and_then(integer),
                last_refresh_timestamp,
            },
            provider_data: raw.provider_user_info,
            tenant_id: raw.tenant_id,
        })
    }
}

/// Timestamps arrive as decimal strings or numbers.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Properties of a new user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateRequest {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub password: Option<String>,
    pub disabled: Option<bool>,
}

impl CreateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }

    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Check every property that is set.
    pub fn validate(&self) -> AdminResult<()> {
        if let Some(uid) = &self.uid {
            validate::uid(uid)?;
        }
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(phone) = &self.phone_number {
            validate::phone_number(phone)?;
        }
        if let Some(password) = &self.password {
            validate::password(password)?;
        }
        if let Some(url) = &self.photo_url {
            validate::photo_url(url)?;
        }
        Ok(())
    }

    /// Body of the `accounts` call.
    pub(crate) fn to_payload(&self) -> Value {
        let mut body = Map::new();
        insert(&mut body, "localId", &self.uid);
        insert(&mut body, "email", &self.email);
        insert(&mut body, "emailVerified", &self.email_verified);
        insert(&mut body, "phoneNumber", &self.phone_number);
        insert(&mut body, "displayName", &self.display_name);
        insert(&mut body, "photoUrl", &self.photo_url);
        insert(&mut body, "password", &self.password);
        insert(&mut body, "disabled", &self.disabled);
        Value::Object(body)
    }
}

/// Changes to an existing user.
///
/// Optional text properties are tri-state: untouched (`None`), cleared
/// (`Some(None)`), or set (`Some(Some(_))`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub phone_number: Option<Option<String>>,
    pub display_name: Option<Option<String>>,
    pub photo_url: Option<Option<String>>,
    pub password: Option<String>,
    pub disabled: Option<bool>,
    pub custom_claims: Option<Option<Map<String, Value>>>,
    /// Revoke tokens issued before this time (seconds since epoch)
    pub valid_since: Option<i64>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }

    /// Set the phone number, or unlink phone sign-in with `None`.
    pub fn phone_number(mut self, phone: Option<String>) -> Self {
        self.phone_number = Some(phone);
        self
    }

    /// Set the display name, or clear it with `None`.
    pub fn display_name(mut self, name: Option<String>) -> Self {
        self.display_name = Some(name);
        self
    }

    /// Set the photo URL, or clear it with `None`.
    pub fn photo_url(mut self, url: Option<String>) -> Self {
        self.photo_url = Some(url);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Replace the custom claims, or remove them all with `None`.
    pub fn custom_claims(mut self, claims: Option<Map<String, Value>>) -> Self {
        self.custom_claims = Some(claims);
        self
    }

    pub fn valid_since(mut self, secs: i64) -> Self {
        self.valid_since = Some(secs);
        self
    }

    /// Whether the request changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check every property that is set.
    pub fn validate(&self) -> AdminResult<()> {
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(Some(phone)) = &self.phone_number {
            validate::phone_number(phone)?;
        }
        if let Some(password) = &self.password {
            validate::password(password)?;
        }
        if let Some(Some(url)) = &self.photo_url {
            validate::photo_url(url)?;
        }
        if let Some(Some(claims)) = &self.custom_claims {
            validate::custom_claims(claims)?;
        }
        Ok(())
    }

    /// Body of the `accounts:update` call for `uid`.
    pub(crate) fn to_payload(&self, uid: &str) -> AdminResult<Value> {
        let mut body = Map::new();
        body.insert("localId".to_string(), json!(uid));
        insert(&mut body, "email", &self.email);
        insert(&mut body, "emailVerified", &self.email_verified);
        insert(&mut body, "password", &self.password);
        insert(&mut body, "disableUser", &self.disabled);

        let mut delete_attributes = Vec::new();
        match &self.display_name {
            Some(Some(name)) => {
                body.insert("displayName".to_string(), json!(name));
            }
            Some(None) => delete_attributes.push("DISPLAY_NAME"),
            None => {}
        }
        match &self.photo_url {
            Some(Some(url)) => {
                body.insert("photoUrl".to_string(), json!(url));
            }
            Some(None) => delete_attributes.push("PHOTO_URL"),
            None => {}
        }
        if !delete_attributes.is_empty() {
            body.insert("deleteAttribute".to_string(), json!(delete_attributes));
        }

        match &self.phone_number {
            Some(Some(phone)) => {
                body.insert("phoneNumber".to_string(), json!(phone));
            }
            Some(None) => {
                body.insert("deleteProvider".to_string(), json!([PHONE_PROVIDER_ID]));
            }
            None => {}
        }

        if let Some(claims) = &self.custom_claims {
            let claims = claims.clone().unwrap_or_default();
            let encoded = serde_json::to_string(&claims).map_err(|e| {
                AdminError::InvalidArgument(format!("custom claims are not serializable: {}", e))
            })?;
            body.insert("customAttributes".to_string(), json!(encoded));
        }

        if let Some(valid_since) = self.valid_since {
            body.insert("validSince".to_string(), json!(valid_since.to_string()));
        }

        Ok(Value::Object(body))
    }
}

fn insert<T: Serialize>(body: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        body.insert(key.to_string(), json!(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lookup_user() {
        let raw: RawUserRecord = serde_json::from_value(json!({
            "localId": "uid-1",
            "email": "user@example.com",
            "emailVerified": true,
            "displayName": "User",
            "phoneNumber": "+15555550100",
            "customAttributes": "{\"admin\":true}",
            "validSince": "1700000000",
            "createdAt": "1690000000000",
            "lastLoginAt": "1695000000000",
            "lastRefreshAt": "2023-11-14T22:13:20.000Z",
            "providerUserInfo": [
                {"providerId": "phone", "rawId": "+15555550100", "phoneNumber": "+15555550100"}
            ]
        }))
        .unwrap();

        let record = UserRecord::try_from(raw).unwrap();

        assert_eq!(record.uid, "uid-1");
        assert!(record.email_verified);
        assert!(!record.disabled);
        assert_eq!(record.custom_claims.unwrap()["admin"], json!(true));
        assert_eq!(record.tokens_valid_after_timestamp, Some(1_700_000_000_000));
        assert_eq!(record.metadata.creation_timestamp, Some(1_690_000_000_000));
        assert_eq!(record.metadata.last_sign_in_timestamp, Some(1_695_000_000_000));
        assert_eq!(record.metadata.last_refresh_timestamp, Some(1_700_000_000_000));
        assert_eq!(record.provider_data[0].provider_id, "phone");
    }

    #[test]
    fn test_decode_minimal_user() {
        let raw: RawUserRecord = serde_json::from_value(json!({"localId": "uid-2"})).unwrap();
        let record = UserRecord::try_from(raw).unwrap();

        assert_eq!(record.uid, "uid-2");
        assert_eq!(record.email, None);
        assert_eq!(record.custom_claims, None);
        assert_eq!(record.tokens_valid_after_timestamp, None);
    }

    #[test]
    fn test_create_payload() {
        let request = CreateRequest::new()
            .email("user@example.com")
            .password("secret123")
            .email_verified(false)
            .disabled(false);

        request.validate().unwrap();
        assert_eq!(
            request.to_payload(),
            json!({
                "email": "user@example.com",
                "password": "secret123",
                "emailVerified": false,
                "disabled": false
            })
        );
    }

    #[test]
    fn test_create_validation() {
        assert!(CreateRequest::new().uid("").validate().is_err());
        assert!(CreateRequest::new().phone_number("555").validate().is_err());
        assert!(CreateRequest::new().password("123").validate().is_err());
    }

    #[test]
    fn test_update_payload_clears_fields() {
        let mut claims = Map::new();
        claims.insert("role".to_string(), json!("editor"));

        let payload = UpdateRequest::new()
            .display_name(None)
            .photo_url(None)
            .phone_number(None)
            .disabled(true)
            .custom_claims(Some(claims))
            .to_payload("uid-1")
            .unwrap();

        assert_eq!(
            payload,
            json!({
                "localId": "uid-1",
                "disableUser": true,
                "deleteAttribute": ["DISPLAY_NAME", "PHOTO_URL"],
                "deleteProvider": ["phone"],
                "customAttributes": "{\"role\":\"editor\"}"
            })
        );
    }

    #[test]
    fn test_update_payload_removes_claims() {
        let payload = UpdateRequest::new()
            .custom_claims(None)
            .valid_since(1_700_000_000)
            .to_payload("uid-1")
            .unwrap();

        assert_eq!(payload["customAttributes"], json!("{}"));
        assert_eq!(payload["validSince"], json!("1700000000"));
    }

    #[test]
    fn test_update_validation() {
        let mut reserved = Map::new();
        reserved.insert("iss".to_string(), json!("x"));

        assert!(UpdateRequest::new().custom_claims(Some(reserved)).validate().is_err());
        assert!(UpdateRequest::new().email("nope").validate().is_err());
        assert!(UpdateRequest::new().phone_number(None).validate().is_ok());
        assert!(UpdateRequest::new().is_empty());
    }
}
