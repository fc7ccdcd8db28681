//! # cookbook-shared
//!
//! Domain vocabulary shared by the storage layer and the HTTP server:
//! identifier newtypes, the permission model, password hashing and a few
//! application-wide constants.

pub mod constants;
pub mod error;
pub mod password;
pub mod types;

pub use error::PasswordError;
pub use types::{Permission, RecipeId, UserId};
