//! # rallybot-store
//!
//! SQLite storage for rallybot: the seeded reference catalog (locales,
//! stages, conditions, vehicle classes, rallies) and per-guild best times.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection`.  The catalog is read once into an immutable
//! [`Catalog`]; best times are written only through
//! [`Database::upsert_best_time`], which is atomic per record.

pub mod catalog;
pub mod database;
pub mod migrations;
pub mod models;
pub mod records;
pub mod seed;

mod error;

pub use catalog::Catalog;
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use seed::{CatalogSeed, SeedStats};
