//! SQLite storage implementation for secmaster.
//!
//! This crate holds every Diesel dependency of the workspace. It implements
//! the repository traits defined in `secmaster-core` and contains:
//! - Database initialization, the read pool and the single writer actor
//! - The security repository (partition replace, inserts, filtered reads)
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! ```text
//! market-data (fetch + normalize)
//!          │
//!          ▼
//!   core (markets, securities)
//!          │ SecurityRepositoryTrait
//!          ▼
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```
//!
//! Reads go through the r2d2 pool. Writes are serialized through
//! [`WriteHandle`], and each write job runs in one immediate transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod securities;
pub mod utils;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, spawn_writer, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use securities::{SecurityDB, SecurityRepository};

// Re-export from secmaster-core for convenience
pub use secmaster_core::errors::{DatabaseError, Error, Result};
