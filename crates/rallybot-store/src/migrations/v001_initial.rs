//! v001 -- Initial schema creation.
//!
//! Creates the reference catalog: `locales`, `stages`, `conditions`,
//! `vehicle_classes` and `rallies`.  Codes compare case-insensitively.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Locales (countries / rally locations)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS locales (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    code         TEXT NOT NULL COLLATE NOCASE UNIQUE,   -- 2-3 letters
    surface_type TEXT NOT NULL                           -- Gravel, Tarmac, Snow
);

-- ----------------------------------------------------------------
-- Stages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS stages (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    locale_id INTEGER NOT NULL,
    name      TEXT NOT NULL,
    code      TEXT NOT NULL COLLATE NOCASE,              -- 2 digits

    UNIQUE (locale_id, code),
    FOREIGN KEY (locale_id) REFERENCES locales(id)
);

-- ----------------------------------------------------------------
-- Surface conditions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conditions (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL COLLATE NOCASE UNIQUE
);

-- ----------------------------------------------------------------
-- Vehicle classes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS vehicle_classes (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code TEXT NOT NULL COLLATE NOCASE UNIQUE
);

-- ----------------------------------------------------------------
-- Rallies: the unit a time is recorded against
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rallies (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    stage_id         INTEGER NOT NULL,
    condition_id     INTEGER NOT NULL,
    vehicle_class_id INTEGER NOT NULL,

    UNIQUE (stage_id, condition_id, vehicle_class_id),
    FOREIGN KEY (stage_id)         REFERENCES stages(id),
    FOREIGN KEY (condition_id)     REFERENCES conditions(id),
    FOREIGN KEY (vehicle_class_id) REFERENCES vehicle_classes(id)
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
