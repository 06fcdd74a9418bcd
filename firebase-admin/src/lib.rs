//! # Firebase Admin
//!
//! Firebase Authentication administration over the Identity Toolkit REST API.
//!
//! ## Overview
//!
//! - **Users**: look up, create, update and delete users ([`AuthClient`])
//! - **ID tokens**: verify Firebase ID tokens against Google's public keys,
//!   optionally checking revocation ([`IdTokenVerifier`])
//! - **Custom tokens**: mint tokens a client SDK exchanges for an ID token
//! - **Credentials**: service account access tokens ([`TokenSource`])
//!
//! Setting `FIREBASE_AUTH_EMULATOR_HOST` points the client at the Auth
//! emulator, which accepts unsigned ID tokens.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use firebase_admin::{AdminConfig, AuthClient};
//!
//! # async fn example() -> Result<(), firebase_admin::AdminError> {
//! let client = AuthClient::new(AdminConfig::from_env()?)?;
//!
//! let claims = client.verify_id_token("eyJhbGciOi...", true).await?;
//! let user = client.get_user(&claims.uid).await?;
//! println!("{} signed in with {}", user.uid, claims.firebase.sign_in_provider);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod credentials;
pub mod custom_token;
pub mod error;
pub mod testing;
pub mod token_verifier;
pub mod user_record;
pub mod validate;

// Re-export main types
pub use auth::AuthClient;
pub use config::{AdminConfig, ConfigError};
pub use credentials::{ServiceAccountCredentials, ServiceAccountKey, StaticToken, TokenSource};
pub use custom_token::{CustomTokenClaims, CUSTOM_TOKEN_AUDIENCE};
pub use error::{AdminError, AdminResult};
pub use token_verifier::{FirebaseClaims, FirebaseInfo, IdTokenVerifier, PublicKeyStore};
pub use user_record::{CreateRequest, UpdateRequest, UserInfo, UserMetadata, UserRecord};
