//! The record-store seam used by [`RallyBot`](crate::RallyBot).

use std::sync::Mutex;

use rallybot_shared::{GuildId, UserId};
use rallybot_store::{
    Database, LeaderboardEntry, Standing, StoreError, TimeSubmission, UpdateOutcome,
};

/// Persistence operations the bot needs.  Each call is atomic on its own;
/// `upsert_best_time` in particular must be atomic per (guild, user, rally).
pub trait RecordStore: Send + Sync {
    fn upsert_best_time(&self, submission: &TimeSubmission) -> Result<UpdateOutcome, StoreError>;

    fn rally_leaderboard(
        &self,
        guild_id: GuildId,
        rally_id: i64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError>;

    fn rally_standing(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        rally_id: i64,
    ) -> Result<Option<Standing>, StoreError>;
}

impl RecordStore for Mutex<Database> {
    fn upsert_best_time(&self, submission: &TimeSubmission) -> Result<UpdateOutcome, StoreError> {
        self.lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .upsert_best_time(submission)
    }

    fn rally_leaderboard(
        &self,
        guild_id: GuildId,
        rally_id: i64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .rally_leaderboard(guild_id, rally_id, limit)
    }

    fn rally_standing(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        rally_id: i64,
    ) -> Result<Option<Standing>, StoreError> {
        self.lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .rally_standing(guild_id, user_id, rally_id)
    }
}
