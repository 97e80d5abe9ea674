//! Notekeep Database Layer
//!
//! This crate provides the persistence layer for Notekeep: users and their
//! notes, stored in SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{DEFAULT_LIMIT, DEFAULT_PAGE, Database, NotePage, NoteQuery};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
