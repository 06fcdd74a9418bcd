//! Configuration for the Firebase Authentication admin client.
//!
//! Configuration is loaded from environment variables with production
//! defaults for the Google endpoints. Endpoint URLs are plain fields so they
//! can be pointed at a mock server or the Auth emulator.

use crate::credentials::ServiceAccountKey;
use crate::error::AdminError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Production Identity Toolkit API.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// Public keys signing Firebase ID tokens, as a JWK set.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix of Firebase ID tokens.
pub const ID_TOKEN_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Largest accepted clock skew in seconds.
pub const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

impl From<ConfigError> for AdminError {
    fn from(err: ConfigError) -> Self {
        AdminError::Config(err.to_string())
    }
}

/// Firebase Authentication admin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Firebase project ID.
    pub project_id: String,

    /// Service account key used for admin calls and custom tokens.
    #[serde(skip)]
    pub credentials: Option<ServiceAccountKey>,

    /// `host:port` of the Auth emulator, when running against it.
    pub emulator_host: Option<String>,

    /// Tenant scoping all user operations.
    pub tenant_id: Option<String>,

    /// Identity Toolkit API base URL.
    pub identity_toolkit_url: String,

    /// JWK set of the ID token signing keys.
    pub jwks_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Tolerated clock skew in seconds when checking token times.
    pub clock_skew_secs: u64,
}

impl AdminConfig {
    /// Production configuration for `project_id`.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credentials: None,
            emulator_host: None,
            tenant_id: None,
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            jwks_url: DEFAULT_JWKS_URL.to_string(),
            timeout_secs: 30,
            clock_skew_secs: 0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FIREBASE_PROJECT_ID`: project ID (falls back to `GOOGLE_CLOUD_PROJECT`,
    ///   then to the key file's `project_id`)
    /// - `GOOGLE_APPLICATION_CREDENTIALS`: path to a service account key file
    /// - `FIREBASE_AUTH_EMULATOR_HOST`: Auth emulator `host:port`
    /// - `FIREBASE_AUTH_TENANT_ID`: tenant ID
    /// - `FIREBASE_AUTH_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `FIREBASE_AUTH_CLOCK_SKEW_SECS`: clock skew tolerance (default: 0)
    pub fn from_env() -> Result<Self, AdminError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdminError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match var("GOOGLE_APPLICATION_CREDENTIALS") {
            Some(path) => Some(ServiceAccountKey::from_file(path)?),
            None => None,
        };

        let project_id = var("FIREBASE_PROJECT_ID")
            .or_else(|| var("GOOGLE_CLOUD_PROJECT"))
            .or_else(|| {
                credentials
                    .as_ref()
                    .map(|key| key.project_id.clone())
                    .filter(|id| !id.is_empty())
            })
            .ok_or_else(|| ConfigError::MissingEnvVar("FIREBASE_PROJECT_ID".to_string()))?;

        let mut config = Self::new(project_id);
        config.credentials = credentials;
        config.emulator_host = var("FIREBASE_AUTH_EMULATOR_HOST");
        config.tenant_id = var("FIREBASE_AUTH_TENANT_ID");

        if let Some(value) = var("FIREBASE_AUTH_TIMEOUT_SECS") {
            config.timeout_secs = parse_secs("FIREBASE_AUTH_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = var("FIREBASE_AUTH_CLOCK_SKEW_SECS") {
            config.clock_skew_secs = parse_secs("FIREBASE_AUTH_CLOCK_SKEW_SECS", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Use a service account key.
    pub fn with_credentials(mut self, key: ServiceAccountKey) -> Self {
        self.credentials = Some(key);
        self
    }

    /// Run against the Auth emulator at `host`.
    pub fn with_emulator(mut self, host: impl Into<String>) -> Self {
        self.emulator_host = Some(host.into());
        self
    }

    /// Scope operations to `tenant_id`.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Whether the client talks to the Auth emulator.
    pub fn is_emulator(&self) -> bool {
        self.emulator_host.is_some()
    }

    /// Base URL of the Identity Toolkit API in use.
    pub fn api_base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) => format!("http://{}/identitytoolkit.googleapis.com", host),
            None => self.identity_toolkit_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL of the project (or tenant) user resources.
    pub fn users_base_url(&self) -> String {
        let mut url = format!("{}/v1/projects/{}", self.api_base_url(), self.project_id);
        if let Some(tenant) = &self.tenant_id {
            url.push_str("/tenants/");
            url.push_str(tenant);
        }
        url
    }

    /// Expected `iss` claim of ID tokens.
    pub fn issuer(&self) -> String {
        format!("{}{}", ID_TOKEN_ISSUER_PREFIX, self.project_id)
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("FIREBASE_PROJECT_ID".to_string()));
        }
        if self.clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::InvalidValue {
                key: "FIREBASE_AUTH_CLOCK_SKEW_SECS".to_string(),
                message: format!("must be at most {} seconds", MAX_CLOCK_SKEW_SECS),
            });
        }
        if !self.is_emulator() && self.credentials.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "GOOGLE_APPLICATION_CREDENTIALS".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a number of seconds, got {:?}", value),
    })
}
