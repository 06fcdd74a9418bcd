//! Create and update schemas for Firebase users
//!
//! Both schemas carry the base user fields plus the Firebase profile
//! fields, validate themselves, and translate into admin API requests.

use crate::error::validation_error;
use firebase_admin::{validate as admin_validate, CreateRequest, UpdateRequest};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use users_core::{
    CreateUpdateDict, UserCreate, UserDict, UsersError, UsersResult, PRIVILEGED_FIELDS,
};
use validator::{Validate, ValidationError};

/// Message when neither sign-in identifier is given.
pub const MISSING_IDENTIFIER: &str = "Either email or phone number must be set.";

/// Fields only a superuser may set, on top of the base privileged fields.
///
/// Custom claims decide superuser status, so they are privileged too.
pub const FIREBASE_PRIVILEGED_FIELDS: &[&str] = &["custom_claims"];

fn strip_privileged(mut dict: UserDict) -> UserDict {
    for field in PRIVILEGED_FIELDS.iter().chain(FIREBASE_PRIVILEGED_FIELDS) {
        dict.remove(*field);
    }
    dict
}

fn strip_phone_separators(phone: &mut String) {
    phone.retain(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'));
}

/// Firebase profile fields shared by create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FirebaseUserFields {
    /// Phone number in E.164 format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub photo_url: Option<String>,

    /// Custom claims, given as an object or a JSON string encoding one
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "claims_object_or_json"
    )]
    #[validate(custom(function = "validate_custom_claims"))]
    pub custom_claims: Option<Map<String, Value>>,
}

impl FirebaseUserFields {
    /// Strip separators from the phone number.
    fn normalize(&mut self) {
        if let Some(phone) = self.phone_number.as_mut() {
            strip_phone_separators(phone);
        }
    }
}

/// Registration schema for Firebase users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_identifier"))]
pub struct CreateFirebaseUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_superuser: bool,

    #[serde(default)]
    pub is_verified: bool,

    #[serde(flatten)]
    #[validate(nested)]
    pub firebase: FirebaseUserFields,
}

impl Default for CreateFirebaseUser {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            firebase: FirebaseUserFields::default(),
        }
    }
}

impl CreateFirebaseUser {
    /// Parse and validate a create dict.
    pub fn from_dict(dict: UserDict) -> UsersResult<Self> {
        let mut data: Self = serde_json::from_value(Value::Object(dict))
            .map_err(|e| UsersError::Validation(e.to_string()))?;
        data.firebase.normalize();
        data.validate().map_err(validation_error)?;
        Ok(data)
    }

    /// The admin API request creating this user.
    ///
    /// Custom claims are not part of it; they are set once the user exists.
    pub fn to_create_request(&self) -> CreateRequest {
        CreateRequest {
            uid: None,
            email: self.email.clone(),
            email_verified: Some(self.is_verified),
            phone_number: self.firebase.phone_number.clone(),
            display_name: self.firebase.display_name.clone(),
            photo_url: self.firebase.photo_url.clone(),
            password: self.password.clone(),
            disabled: Some(!self.is_active),
        }
    }
}

impl CreateUpdateDict for CreateFirebaseUser {
    fn create_update_dict(&self) -> UsersResult<UserDict> {
        Ok(strip_privileged(self.create_update_dict_superuser()?))
    }
}

impl UserCreate for CreateFirebaseUser {
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Update schema for Firebase users. Every field is optional.
///
/// The profile fields are tri-state: absent leaves the value untouched,
/// `null` clears it, and a value sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_fields"))]
pub struct UpdateFirebaseUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,

    /// Phone number in E.164 format
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub phone_number: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub display_name: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable"
    )]
    pub photo_url: Option<Option<String>>,

    /// Custom claims; `null` removes every claim
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "nullable_claims"
    )]
    pub custom_claims: Option<Option<Map<String, Value>>>,
}

impl UpdateFirebaseUser {
    /// Parse and validate an update dict.
    pub fn from_dict(dict: UserDict) -> UsersResult<Self> {
        let mut data: Self = serde_json::from_value(Value::Object(dict))
            .map_err(|e| UsersError::Validation(e.to_string()))?;
        if let Some(Some(phone)) = data.phone_number.as_mut() {
            strip_phone_separators(phone);
        }
        data.validate().map_err(validation_error)?;
        Ok(data)
    }

    /// The admin API request applying this update.
    ///
    /// Unset fields are left untouched; cleared fields are deleted.
    pub fn to_update_request(&self) -> UpdateRequest {
        let mut request = UpdateRequest::new();
        request.email = self.email.clone();
        request.password = self.password.clone();
        request.email_verified = self.is_verified;
        request.disabled = self.is_active.map(|active| !active);
        if let Some(phone) = &self.phone_number {
            request = request.phone_number(phone.clone());
        }
        if let Some(name) = &self.display_name {
            request = request.display_name(name.clone());
        }
        if let Some(url) = &self.photo_url {
            request = request.photo_url(url.clone());
        }
        if let Some(claims) = &self.custom_claims {
            request = request.custom_claims(claims.clone());
        }
        request
    }
}

impl CreateUpdateDict for UpdateFirebaseUser {
    fn create_update_dict(&self) -> UsersResult<UserDict> {
        Ok(strip_privileged(self.create_update_dict_superuser()?))
    }

    /// Unlike the base schemas, explicit `null`s are kept: they clear the
    /// field.
    fn create_update_dict_superuser(&self) -> UsersResult<UserDict> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut dict)) => {
                dict.remove("id");
                Ok(dict)
            }
            Ok(_) => Err(UsersError::Internal(
                "Schema must serialize to an object".to_string(),
            )),
            Err(e) => Err(UsersError::Internal(format!(
                "Schema serialization failed: {}",
                e
            ))),
        }
    }
}

fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if admin_validate::is_valid_e164(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_phone_number");
        err.message = Some("Phone number must be in E.164 format".into());
        Err(err)
    }
}

fn validate_photo_url(url: &str) -> Result<(), ValidationError> {
    admin_validate::photo_url(url).map_err(|e| {
        let mut err = ValidationError::new("invalid_photo_url");
        err.message = Some(e.to_string().into());
        err
    })
}

fn validate_update_fields(data: &UpdateFirebaseUser) -> Result<(), ValidationError> {
    if let Some(Some(phone)) = &data.phone_number {
        validate_phone_number(phone)?;
    }
    if let Some(Some(url)) = &data.photo_url {
        validate_photo_url(url)?;
    }
    if let Some(Some(claims)) = &data.custom_claims {
        validate_custom_claims(claims)?;
    }
    Ok(())
}

fn validate_custom_claims(claims: &Map<String, Value>) -> Result<(), ValidationError> {
    admin_validate::custom_claims(claims).map_err(|e| {
        let mut err = ValidationError::new("invalid_custom_claims");
        err.message = Some(e.to_string().into());
        err
    })
}

fn validate_identifier(data: &CreateFirebaseUser) -> Result<(), ValidationError> {
    if data.email.is_none() && data.firebase.phone_number.is_none() {
        let mut err = ValidationError::new("missing_identifier");
        err.message = Some(MISSING_IDENTIFIER.into());
        return Err(err);
    }
    Ok(())
}

fn claims_object_or_json<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_claims::<D::Error>(value).map(Some),
    }
}

/// A present field is `Some`, even when it is `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_claims<'de, D>(deserializer: D) -> Result<Option<Option<Map<String, Value>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        value => parse_claims::<D::Error>(value).map(|claims| Some(Some(claims))),
    }
}

fn parse_claims<E: serde::de::Error>(value: Value) -> Result<Map<String, Value>, E> {
    match value {
        Value::Object(claims) => Ok(claims),
        Value::String(json) => match serde_json::from_str::<Value>(&json) {
            Ok(Value::Object(claims)) => Ok(claims),
            Ok(_) => Err(E::custom("custom_claims must encode a JSON object")),
            Err(e) => Err(E::custom(format!("custom_claims is not valid JSON: {}", e))),
        },
        _ => Err(E::custom("custom_claims must be an object or a JSON string")),
    }
}

fn default_true() -> bool {
    true
}
