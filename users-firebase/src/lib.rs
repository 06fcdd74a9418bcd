//! # Users Firebase
//!
//! Firebase Authentication as the identity store behind `users-core`.
//!
//! ## Overview
//!
//! - [`FirebaseUser`]: a Firebase user record seen as a `UserProtocol`
//! - [`FirebaseUserDatabase`]: users read from and written to Firebase
//! - [`FirebaseUserManager`]: registration, updates and deletion; flows
//!   owned by the Firebase client SDKs are refused with 403
//! - [`FirebaseIdTokenStrategy`]: bearer tokens are Firebase ID tokens,
//!   verified with a revocation check
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use firebase_admin::AuthClient;
//! use users_core::{AuthenticationBackend, BearerTransport, UserRequirements};
//! use users_firebase::{
//!     superuser_claim, FirebaseIdTokenStrategy, FirebaseUserDatabase, FirebaseUserManager,
//! };
//!
//! # async fn example(authorization: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(AuthClient::from_env()?);
//! let db = FirebaseUserDatabase::new(client.clone()).with_superuser(superuser_claim("admin"));
//! let manager = FirebaseUserManager::new(db);
//!
//! let backend = AuthenticationBackend::new(
//!     "firebase",
//!     BearerTransport::default(),
//!     FirebaseIdTokenStrategy::new(client),
//! );
//!
//! let _user = backend
//!     .current_user(authorization, &manager, UserRequirements::active())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
pub mod manager;
pub mod schemas;
pub mod strategy;
pub mod user;

// Re-export main types
pub use database::FirebaseUserDatabase;
pub use error::provider_error;
pub use manager::{FirebaseUserManager, CLIENT_SDK_REQUIRED};
pub use schemas::{
    CreateFirebaseUser, FirebaseUserFields, UpdateFirebaseUser, FIREBASE_PRIVILEGED_FIELDS,
    MISSING_IDENTIFIER,
};
pub use strategy::FirebaseIdTokenStrategy;
pub use user::{superuser_claim, FirebaseUser, IsSuperuser, Uid};
