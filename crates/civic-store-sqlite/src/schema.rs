//! SQL schema for the civic SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category    TEXT NOT NULL,
    photo_url   TEXT,
    latitude    REAL,
    longitude   REAL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS report_votes (
    report_id   TEXT NOT NULL REFERENCES reports(report_id),
    voter_id    TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    PRIMARY KEY (report_id, voter_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    report_id   TEXT NOT NULL REFERENCES reports(report_id),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- The ledger is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS points_ledger (
    entry_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    source      TEXT NOT NULL,   -- camelCase PointSource tag
    points      INTEGER NOT NULL,
    meta        TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

-- Static reference data, seeded from the badge catalogue.
CREATE TABLE IF NOT EXISTS badges (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    rarity      TEXT NOT NULL,   -- 'bronze' | 'silver' | 'gold' | 'platinum'
    icon_name   TEXT NOT NULL,
    color       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_badges (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    badge_id    TEXT NOT NULL REFERENCES badges(id),
    earned_at   TEXT NOT NULL,
    PRIMARY KEY (user_id, badge_id)
);

CREATE TABLE IF NOT EXISTS activity_log (
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    happened_on TEXT NOT NULL,   -- YYYY-MM-DD, UTC
    action      TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (user_id, happened_on)
);

CREATE INDEX IF NOT EXISTS ledger_user_idx    ON points_ledger(user_id, created_at);
CREATE INDEX IF NOT EXISTS reports_user_idx   ON reports(user_id);
CREATE INDEX IF NOT EXISTS votes_voter_idx    ON report_votes(voter_id);

PRAGMA user_version = 1;
";

/// Insert-if-absent for one catalogue badge.
pub const SEED_BADGE: &str = "
INSERT OR IGNORE INTO badges (id, name, description, rarity, icon_name, color)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
