//! # cookbook-store
//!
//! SQLite storage for the Cookbook backend.
//!
//! [`Store`] is the process-wide handle: it knows where the database lives,
//! runs migrations once at startup and hands out one [`Database`] per
//! operation.  A `Database` wraps a single `rusqlite::Connection` and
//! provides typed helpers for users, recipes and likes; the connection is
//! closed when the `Database` is dropped.

pub mod database;
pub mod likes;
pub mod migrations;
pub mod models;
pub mod recipes;
pub mod users;

mod error;

pub use database::{Database, Store};
pub use error::{Result, StoreError};
pub use models::*;
