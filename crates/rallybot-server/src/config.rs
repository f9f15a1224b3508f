//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use rallybot_core::BotSettings;
use rallybot_shared::constants::{
    DEFAULT_BOARD_LIMIT, DEFAULT_HTTP_PORT, DEFAULT_PERMALINK_BASE, DEFAULT_PREFIX,
};

use crate::rate_limit::Quota;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) command adapter.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `None` (platform data directory).
    pub database_path: Option<PathBuf>,

    /// JSON catalog seed, applied when the catalog is empty.
    /// Env: `CATALOG_SEED_PATH`
    /// Default: `./data/dirt-rally-2.json`
    pub catalog_seed_path: PathBuf,

    /// Invocation prefix for chat commands.
    /// Env: `COMMAND_PREFIX`
    /// Default: `!rallybot`
    pub prefix: String,

    /// Base URL for proof permalinks.
    /// Env: `PERMALINK_BASE`
    /// Default: `https://discord.com/channels`
    pub permalink_base: String,

    /// Maximum rows in a leaderboard reply.
    /// Env: `BOARD_LIMIT`
    /// Default: `10`
    pub board_limit: usize,

    /// Sustained commands per second per guild user.
    /// Env: `RATE_LIMIT_PER_SEC`
    /// Default: `1.0`
    pub rate_limit_per_sec: f64,

    /// Burst size per guild user.
    /// Env: `RATE_LIMIT_BURST`
    /// Default: `5.0`
    pub rate_limit_burst: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            catalog_seed_path: PathBuf::from("./data/dirt-rally-2.json"),
            prefix: DEFAULT_PREFIX.to_string(),
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            board_limit: DEFAULT_BOARD_LIMIT,
            rate_limit_per_sec: 1.0,
            rate_limit_burst: 5.0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = var("DATABASE_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(path) = var("CATALOG_SEED_PATH").filter(|p| !p.is_empty()) {
            config.catalog_seed_path = PathBuf::from(path);
        }

        if let Some(prefix) = var("COMMAND_PREFIX").filter(|p| !p.trim().is_empty()) {
            config.prefix = prefix;
        }

        if let Some(base) = var("PERMALINK_BASE").filter(|b| !b.is_empty()) {
            config.permalink_base = base;
        }

        if let Some(val) = var("BOARD_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.board_limit = n,
                _ => tracing::warn!(value = %val, "Invalid BOARD_LIMIT, using default"),
            }
        }

        if let Some(val) = var("RATE_LIMIT_PER_SEC") {
            match val.parse::<f64>() {
                Ok(rate) if rate > 0.0 => config.rate_limit_per_sec = rate,
                _ => tracing::warn!(value = %val, "Invalid RATE_LIMIT_PER_SEC, using default"),
            }
        }

        if let Some(val) = var("RATE_LIMIT_BURST") {
            match val.parse::<f64>() {
                Ok(burst) if burst >= 1.0 => config.rate_limit_burst = burst,
                _ => tracing::warn!(value = %val, "Invalid RATE_LIMIT_BURST, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn quota(&self) -> Quota {
        Quota {
            per_second: self.rate_limit_per_sec,
            burst: self.rate_limit_burst,
        }
    }

    pub fn bot_settings(&self) -> BotSettings {
        BotSettings {
            prefix: self.prefix.clone(),
            permalink_base: self.permalink_base.clone(),
            board_limit: self.board_limit,
        }
    }
}
