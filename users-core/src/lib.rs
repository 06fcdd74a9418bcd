//! # Users Core
//!
//! The seams a user-management backend plugs into.
//!
//! ## Overview
//!
//! The users-core crate defines:
//! - **Users**: [`UserProtocol`], the fields access checks read
//! - **Databases**: [`UserDatabase`], storage of users
//! - **Managers**: [`UserManager`] and [`UserHooks`], the business rules
//! - **Strategies**: [`Strategy`], turning tokens into users
//! - **Transport**: [`BearerTransport`], tokens in the `Authorization` header
//! - **Backends**: [`AuthenticationBackend`], resolving the current user
//!
//! Backends for a concrete identity store (for instance Firebase
//! Authentication in `users-firebase`) implement the database, manager and
//! strategy traits.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use users_core::{AuthenticationBackend, Strategy, UserManager, UserRequirements};
//!
//! async fn me<M, S>(backend: &AuthenticationBackend<S>, manager: &M, header: Option<&str>)
//! where
//!     M: UserManager,
//!     S: Strategy<M>,
//! {
//!     match backend.current_user(header, manager, UserRequirements::active()).await {
//!         Ok(Some(_user)) => println!("authenticated"),
//!         Ok(None) => println!("anonymous"),
//!         Err(e) => println!("rejected with {}", e.status_code()),
//!     }
//! }
//! ```

pub mod authenticator;
pub mod db;
pub mod error;
pub mod manager;
pub mod models;
pub mod schemas;
pub mod strategy;
pub mod transport;

// Re-export main types
pub use authenticator::{AuthenticationBackend, UserRequirements};
pub use db::UserDatabase;
pub use error::{UsersError, UsersResult};
pub use manager::{NoopHooks, UserHooks, UserManager};
pub use models::UserProtocol;
pub use schemas::{
    BaseUserCreate, BaseUserUpdate, CreateUpdateDict, PasswordCredentials, UserCreate, UserDict,
    PRIVILEGED_FIELDS,
};
pub use strategy::Strategy;
pub use transport::{BearerResponse, BearerTransport};
