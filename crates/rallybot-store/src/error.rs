use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory, reading a seed).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// The catalog seed is internally inconsistent.
    #[error("Invalid catalog seed: {0}")]
    Seed(String),

    /// The catalog seed is not valid JSON for [`crate::CatalogSeed`].
    #[error("Catalog seed format error: {0}")]
    SeedFormat(#[from] serde_json::Error),

    /// A thread panicked while holding the database lock.
    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
