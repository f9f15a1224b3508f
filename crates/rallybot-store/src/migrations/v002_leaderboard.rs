//! v002 -- Per-guild best times.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS guild_users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id   TEXT NOT NULL,                 -- decimal snowflake
    user_id    TEXT NOT NULL,                 -- decimal snowflake
    created_at TEXT NOT NULL,                 -- RFC-3339

    UNIQUE (guild_id, user_id)
);

-- One row per (guild user, rally), always holding the best time seen.
CREATE TABLE IF NOT EXISTS user_times (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_user_id INTEGER NOT NULL,
    rally_id      INTEGER NOT NULL,
    time_ms       INTEGER NOT NULL,
    permalink     TEXT NOT NULL,
    is_verified   INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    updated_at    TEXT NOT NULL,

    UNIQUE (guild_user_id, rally_id),
    FOREIGN KEY (guild_user_id) REFERENCES guild_users(id) ON DELETE CASCADE,
    FOREIGN KEY (rally_id)      REFERENCES rallies(id)
);

CREATE INDEX IF NOT EXISTS idx_user_times_rally_time
    ON user_times(rally_id, time_ms ASC);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
