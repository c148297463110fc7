//! Database module: policy storage and the provisioning target.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring policy rows and conversions
//! - `schema.rs`: SQL DDL for initializing the policy store (SQLite)
//! - `sqlite.rs`: role and lease persistence
//! - `target.rs`: connection pool for the database credentials are issued in

pub mod models;
pub mod schema;
pub mod sqlite;
pub mod target;

pub use models::{DbLease, DbRole};
pub use schema::SQLITE_INIT;
pub use sqlite::{PolicyStorage, SqlitePool};
pub use target::{Catalog, Dialect, TargetDatabase};
