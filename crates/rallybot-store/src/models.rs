//! Domain model structs persisted in the rallybot database.
//!
//! Catalog rows (`Locale` through `Rally`) are administrator-seeded and
//! read-only at runtime.  `GuildUser` and `UserTime` are written by the
//! record-update path.

use chrono::{DateTime, Utc};
use rallybot_shared::{GuildId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A rally location (usually a country).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locale {
    pub id: i64,
    pub name: String,
    /// 2-3 letter shorthand, compared case-insensitively.
    pub code: String,
    /// Dominant surface, e.g. `Gravel` or `Tarmac`. Display only.
    pub surface_type: String,
}

/// A stage within a locale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub id: i64,
    pub locale_id: i64,
    pub name: String,
    /// 2-digit shorthand, unique within the locale.
    pub code: String,
}

/// Surface / weather condition (`Dry`, `Wet`, `Snow`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Condition {
    pub id: i64,
    pub name: String,
}

/// A car class / group such as `H1 FWD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleClass {
    pub id: i64,
    pub name: String,
    pub code: String,
}

/// A unique (stage, condition, vehicle class) combination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rally {
    pub id: i64,
    pub stage_id: i64,
    pub condition_id: i64,
    pub vehicle_class_id: i64,
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// A participant within one guild. Created lazily on the first recorded time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildUser {
    pub id: i64,
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// The best time a guild user has posted on a rally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserTime {
    pub id: i64,
    pub guild_user_id: i64,
    pub rally_id: i64,
    pub time_ms: u32,
    /// Link to the chat message that proves the time.
    pub permalink: String,
    pub is_verified: bool,
    pub updated_at: DateTime<Utc>,
}

/// A time submitted for recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSubmission {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub rally_id: i64,
    pub time_ms: u32,
    pub permalink: String,
}

/// Result of [`Database::upsert_best_time`](crate::Database::upsert_best_time).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// First time for this (guild user, rally).
    NewRecord { rank: u32 },
    /// Strictly faster than the stored best; stored time and permalink replaced.
    Improved { previous_time_ms: u32, rank: u32 },
    /// Equal or slower; nothing changed.
    NotImproved { previous_time_ms: u32 },
}

/// One row of a guild leaderboard for a rally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1 + number of guild times strictly lower. Ties share a rank.
    pub rank: u32,
    pub user_id: UserId,
    pub time_ms: u32,
    pub permalink: String,
    pub is_verified: bool,
}

/// A user's current position on a rally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub rank: u32,
    pub time_ms: u32,
    pub permalink: String,
    /// Number of guild users with a time on the rally.
    pub entrants: u32,
}
