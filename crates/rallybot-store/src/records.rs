//! Best-time records and rank queries.
//!
//! [`Database::upsert_best_time`] is the only writer.  It composes the
//! find/create helpers below inside one `BEGIN IMMEDIATE` transaction, so two
//! submissions for the same (guild, user, rally) can neither both insert nor
//! let a slower time overwrite a faster one.

use chrono::{DateTime, Utc};
use rallybot_shared::{GuildId, UserId};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::database::Database;
use crate::error::Result;
use crate::models::{
    GuildUser, LeaderboardEntry, Standing, TimeSubmission, UpdateOutcome, UserTime,
};

impl Database {
    /// Keep only the best time per (guild, user, rally) and report the rank.
    pub fn upsert_best_time(&mut self, submission: &TimeSubmission) -> Result<UpdateOutcome> {
        let tx = self
            .conn_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let guild_user = match find_guild_user(&tx, submission.guild_id, submission.user_id)? {
            Some(user) => user,
            None => create_guild_user(&tx, submission.guild_id, submission.user_id)?,
        };

        let outcome = match find_user_time(&tx, guild_user.id, submission.rally_id)? {
            None => {
                create_user_time(
                    &tx,
                    guild_user.id,
                    submission.rally_id,
                    submission.time_ms,
                    &submission.permalink,
                )?;
                UpdateOutcome::NewRecord {
                    rank: rank_for_time(
                        &tx,
                        submission.guild_id,
                        submission.rally_id,
                        submission.time_ms,
                    )?,
                }
            }
            Some(existing) if submission.time_ms < existing.time_ms => {
                replace_user_time(&tx, existing.id, submission.time_ms, &submission.permalink)?;
                UpdateOutcome::Improved {
                    previous_time_ms: existing.time_ms,
                    rank: rank_for_time(
                        &tx,
                        submission.guild_id,
                        submission.rally_id,
                        submission.time_ms,
                    )?,
                }
            }
            // Ties keep the original proof.
            Some(existing) => UpdateOutcome::NotImproved {
                previous_time_ms: existing.time_ms,
            },
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// Guild leaderboard for a rally, fastest first, at most `limit` rows.
    pub fn rally_leaderboard(
        &self,
        guild_id: GuildId,
        rally_id: i64,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT gu.user_id, ut.time_ms, ut.permalink, ut.is_verified
             FROM user_times ut
             JOIN guild_users gu ON gu.id = ut.guild_user_id
             WHERE gu.guild_id = ?1 AND ut.rally_id = ?2
             ORDER BY ut.time_ms ASC, ut.updated_at ASC, ut.id ASC
             LIMIT ?3",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(
            params![guild_id.to_string(), rally_id, limit],
            |row| {
                let user_id: String = row.get(0)?;
                Ok((
                    parse_snowflake::<UserId>(0, &user_id)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            },
        )?;

        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        for (position, row) in rows.enumerate() {
            let (user_id, time_ms, permalink, is_verified) = row?;
            let rank = match entries.last() {
                Some(prev) if prev.time_ms == time_ms => prev.rank,
                _ => u32::try_from(position + 1).unwrap_or(u32::MAX),
            };
            entries.push(LeaderboardEntry {
                rank,
                user_id,
                time_ms,
                permalink,
                is_verified,
            });
        }
        Ok(entries)
    }

    /// The user's best time and current rank on a rally, if they have one.
    pub fn rally_standing(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        rally_id: i64,
    ) -> Result<Option<Standing>> {
        let Some(guild_user) = find_guild_user(self.conn(), guild_id, user_id)? else {
            return Ok(None);
        };
        let Some(time) = find_user_time(self.conn(), guild_user.id, rally_id)? else {
            return Ok(None);
        };

        let entrants: u32 = self.conn().query_row(
            "SELECT COUNT(*)
             FROM user_times ut
             JOIN guild_users gu ON gu.id = ut.guild_user_id
             WHERE gu.guild_id = ?1 AND ut.rally_id = ?2",
            params![guild_id.to_string(), rally_id],
            |row| row.get(0),
        )?;

        Ok(Some(Standing {
            rank: rank_for_time(self.conn(), guild_id, rally_id, time.time_ms)?,
            time_ms: time.time_ms,
            permalink: time.permalink,
            entrants,
        }))
    }
}

// ---------------------------------------------------------------------------
// Find / create primitives. Callers compose them inside a transaction.
// ---------------------------------------------------------------------------

pub fn find_guild_user(
    conn: &Connection,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<Option<GuildUser>> {
    Ok(conn
        .query_row(
            "SELECT id, guild_id, user_id, created_at
             FROM guild_users WHERE guild_id = ?1 AND user_id = ?2",
            params![guild_id.to_string(), user_id.to_string()],
            row_to_guild_user,
        )
        .optional()?)
}

pub fn create_guild_user(
    conn: &Connection,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<GuildUser> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO guild_users (guild_id, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![guild_id.to_string(), user_id.to_string(), now.to_rfc3339()],
    )?;

    tracing::debug!(guild = %guild_id, user = %user_id, "guild user created");

    Ok(GuildUser {
        id: conn.last_insert_rowid(),
        guild_id,
        user_id,
        created_at: now,
    })
}

pub fn find_user_time(
    conn: &Connection,
    guild_user_id: i64,
    rally_id: i64,
) -> Result<Option<UserTime>> {
    Ok(conn
        .query_row(
            "SELECT id, guild_user_id, rally_id, time_ms, permalink, is_verified, updated_at
             FROM user_times WHERE guild_user_id = ?1 AND rally_id = ?2",
            params![guild_user_id, rally_id],
            row_to_user_time,
        )
        .optional()?)
}

pub fn create_user_time(
    conn: &Connection,
    guild_user_id: i64,
    rally_id: i64,
    time_ms: u32,
    permalink: &str,
) -> Result<UserTime> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO user_times (guild_user_id, rally_id, time_ms, permalink, is_verified, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![guild_user_id, rally_id, time_ms, permalink, now.to_rfc3339()],
    )?;

    Ok(UserTime {
        id: conn.last_insert_rowid(),
        guild_user_id,
        rally_id,
        time_ms,
        permalink: permalink.to_string(),
        is_verified: false,
        updated_at: now,
    })
}

fn replace_user_time(conn: &Connection, id: i64, time_ms: u32, permalink: &str) -> Result<()> {
    conn.execute(
        "UPDATE user_times
         SET time_ms = ?1, permalink = ?2, is_verified = 0, updated_at = ?3
         WHERE id = ?4",
        params![time_ms, permalink, Utc::now().to_rfc3339(), id],
    )?;
    Ok(())
}

/// 1 + number of guild times on the rally strictly lower than `time_ms`.
pub fn rank_for_time(
    conn: &Connection,
    guild_id: GuildId,
    rally_id: i64,
    time_ms: u32,
) -> Result<u32> {
    let faster: u32 = conn.query_row(
        "SELECT COUNT(*)
         FROM user_times ut
         JOIN guild_users gu ON gu.id = ut.guild_user_id
         WHERE gu.guild_id = ?1 AND ut.rally_id = ?2 AND ut.time_ms < ?3",
        params![guild_id.to_string(), rally_id, time_ms],
        |row| row.get(0),
    )?;
    Ok(faster + 1)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_guild_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<GuildUser> {
    let guild_str: String = row.get(1)?;
    let user_str: String = row.get(2)?;
    let created_str: String = row.get(3)?;

    Ok(GuildUser {
        id: row.get(0)?,
        guild_id: parse_snowflake(1, &guild_str)?,
        user_id: parse_snowflake(2, &user_str)?,
        created_at: parse_timestamp(3, &created_str)?,
    })
}

fn row_to_user_time(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserTime> {
    let updated_str: String = row.get(6)?;

    Ok(UserTime {
        id: row.get(0)?,
        guild_user_id: row.get(1)?,
        rally_id: row.get(2)?,
        time_ms: row.get(3)?,
        permalink: row.get(4)?,
        is_verified: row.get(5)?,
        updated_at: parse_timestamp(6, &updated_str)?,
    })
}

fn parse_snowflake<T>(idx: usize, s: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = rallybot_shared::SharedError>,
{
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::CatalogSeed;

    const SEED: &str = r#"{
        "conditions": ["Dry", "Wet"],
        "vehicle_classes": [ { "code": "h1", "name": "H1 FWD" } ],
        "locales": [
            {
                "code": "us", "name": "USA", "surface_type": "Gravel",
                "conditions": ["Dry", "Wet"],
                "stages": [ { "code": "01", "name": "North Fork Pass" } ]
            }
        ]
    }"#;

    const GUILD: GuildId = GuildId(100);

    fn setup() -> (Database, i64) {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_catalog(&CatalogSeed::from_json(SEED).unwrap())
            .unwrap();
        let rally_id = db.load_catalog().unwrap().rallies()[0].id;
        (db, rally_id)
    }

    fn submit(db: &mut Database, user: u64, rally_id: i64, time_ms: u32) -> UpdateOutcome {
        db.upsert_best_time(&TimeSubmission {
            guild_id: GUILD,
            user_id: UserId(user),
            rally_id,
            time_ms,
            permalink: format!("https://example.test/{user}/{time_ms}"),
        })
        .unwrap()
    }

    fn stored(db: &Database, user: u64, rally_id: i64) -> UserTime {
        let gu = find_guild_user(db.conn(), GUILD, UserId(user))
            .unwrap()
            .unwrap();
        find_user_time(db.conn(), gu.id, rally_id).unwrap().unwrap()
    }

    #[test]
    fn first_submission_is_new_record() {
        let (mut db, rally) = setup();
        assert_eq!(
            submit(&mut db, 1, rally, 83_456),
            UpdateOutcome::NewRecord { rank: 1 }
        );
        let row = stored(&db, 1, rally);
        assert_eq!(row.time_ms, 83_456);
        assert!(!row.is_verified);
    }

    #[test]
    fn slower_time_is_not_improved() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 83_456);
        assert_eq!(
            submit(&mut db, 1, rally, 90_000),
            UpdateOutcome::NotImproved {
                previous_time_ms: 83_456
            }
        );
        assert_eq!(stored(&db, 1, rally).time_ms, 83_456);
    }

    #[test]
    fn faster_time_replaces_time_and_permalink() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 83_456);
        assert_eq!(
            submit(&mut db, 1, rally, 70_000),
            UpdateOutcome::Improved {
                previous_time_ms: 83_456,
                rank: 1
            }
        );
        let row = stored(&db, 1, rally);
        assert_eq!(row.time_ms, 70_000);
        assert_eq!(row.permalink, "https://example.test/1/70000");
    }

    #[test]
    fn tie_keeps_original_proof_and_is_idempotent() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 83_456);
        submit(&mut db, 2, rally, 80_000);
        for _ in 0..3 {
            assert_eq!(
                submit(&mut db, 1, rally, 83_456),
                UpdateOutcome::NotImproved {
                    previous_time_ms: 83_456
                }
            );
        }
        let row = stored(&db, 1, rally);
        assert_eq!(row.permalink, "https://example.test/1/83456");
        assert_eq!(
            db.rally_standing(GUILD, UserId(1), rally).unwrap().unwrap().rank,
            2
        );
    }

    #[test]
    fn stored_time_is_minimum_of_submissions() {
        let (mut db, rally) = setup();
        let times = [95_000, 91_250, 99_999, 88_001, 88_001, 120_000, 88_500];
        for t in times {
            submit(&mut db, 7, rally, t);
        }
        assert_eq!(stored(&db, 7, rally).time_ms, 88_001);
    }

    #[test]
    fn faster_rival_pushes_rank_down() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 80_000);
        submit(&mut db, 2, rally, 85_000);
        assert_eq!(
            db.rally_standing(GUILD, UserId(2), rally).unwrap().unwrap().rank,
            2
        );

        assert_eq!(
            submit(&mut db, 3, rally, 75_000),
            UpdateOutcome::NewRecord { rank: 1 }
        );
        assert_eq!(
            db.rally_standing(GUILD, UserId(1), rally).unwrap().unwrap().rank,
            2
        );
        assert_eq!(
            db.rally_standing(GUILD, UserId(2), rally).unwrap().unwrap().rank,
            3
        );
    }

    #[test]
    fn ranks_are_scoped_per_guild() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 80_000);
        let outcome = db
            .upsert_best_time(&TimeSubmission {
                guild_id: GuildId(999),
                user_id: UserId(2),
                rally_id: rally,
                time_ms: 90_000,
                permalink: "p".into(),
            })
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NewRecord { rank: 1 });
    }

    #[test]
    fn leaderboard_orders_and_shares_tied_ranks() {
        let (mut db, rally) = setup();
        submit(&mut db, 1, rally, 90_000);
        submit(&mut db, 2, rally, 80_000);
        submit(&mut db, 3, rally, 90_000);
        submit(&mut db, 4, rally, 95_000);

        let board = db.rally_leaderboard(GUILD, rally, 10).unwrap();
        let ranks: Vec<(u64, u32)> = board.iter().map(|e| (e.user_id.0, e.rank)).collect();
        assert_eq!(ranks, vec![(2, 1), (1, 2), (3, 2), (4, 4)]);

        assert_eq!(db.rally_leaderboard(GUILD, rally, 2).unwrap().len(), 2);
    }

    #[test]
    fn standing_is_none_without_a_time() {
        let (mut db, rally) = setup();
        assert!(db.rally_standing(GUILD, UserId(1), rally).unwrap().is_none());
        submit(&mut db, 1, rally, 80_000);
        let standing = db.rally_standing(GUILD, UserId(1), rally).unwrap().unwrap();
        assert_eq!(standing.entrants, 1);
        assert!(db.rally_standing(GUILD, UserId(2), rally).unwrap().is_none());
    }

    #[test]
    fn concurrent_connections_never_duplicate_a_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");
        let rally = {
            let mut db = Database::open_at(&path).unwrap();
            db.seed_catalog(&CatalogSeed::from_json(SEED).unwrap())
                .unwrap();
            db.load_catalog().unwrap().rallies()[0].id
        };

        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut db = Database::open_at(&path).unwrap();
                    for t in 0..10u32 {
                        db.upsert_best_time(&TimeSubmission {
                            guild_id: GUILD,
                            user_id: UserId(1),
                            rally_id: rally,
                            time_ms: 100_000 - i * 100 - t,
                            permalink: format!("{i}-{t}"),
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let rows: u32 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM user_times", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(stored(&db, 1, rally).time_ms, 100_000 - 300 - 9);
    }
}
