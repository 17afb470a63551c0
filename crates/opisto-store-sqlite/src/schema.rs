//! SQL schema for the Opisto SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Cross-table references are enforced by the store layer, not by
/// engine-level foreign keys; the one engine-level constraint is the UNIQUE
/// index on usernames, a backstop behind the lookup-first check in
/// `create_user`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    username   TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    password   TEXT NOT NULL,    -- encoded credential string, never plaintext
    role       INTEGER NOT NULL  -- 0 student .. 4 admin
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    short_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    course_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    short_name  TEXT NOT NULL,
    description TEXT NOT NULL,
    subject_id  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS study_groups (
    group_id   TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    course_id  TEXT NOT NULL,
    teacher_id TEXT,              -- NULL until a teacher is assigned
    start_date INTEGER NOT NULL,  -- epoch seconds
    end_date   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS group_times (
    time_id     TEXT PRIMARY KEY,
    group_id    TEXT NOT NULL,
    start_time  INTEGER NOT NULL,
    end_time    INTEGER NOT NULL,
    day_of_week INTEGER NOT NULL
);

-- No UNIQUE(group_id, reserver_id): duplicate reservations are a caller
-- concern.
CREATE TABLE IF NOT EXISTS group_reservations (
    reservation_id TEXT PRIMARY KEY,
    group_id       TEXT NOT NULL,
    reserver_id    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    message_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    contents    TEXT NOT NULL,
    sender_id   TEXT NOT NULL,
    responds_to TEXT              -- NULL for top-level messages; may dangle
);

CREATE TABLE IF NOT EXISTS message_recipients (
    recipient_id TEXT PRIMARY KEY,
    message_id   TEXT NOT NULL,
    user_id      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS courses_subject_idx       ON courses(subject_id);
CREATE INDEX IF NOT EXISTS study_groups_course_idx   ON study_groups(course_id);
CREATE INDEX IF NOT EXISTS group_times_group_idx     ON group_times(group_id);
CREATE INDEX IF NOT EXISTS reservations_group_idx    ON group_reservations(group_id);
CREATE INDEX IF NOT EXISTS reservations_reserver_idx ON group_reservations(reserver_id);
CREATE INDEX IF NOT EXISTS messages_responds_idx     ON messages(responds_to);
CREATE INDEX IF NOT EXISTS recipients_message_idx    ON message_recipients(message_id);
CREATE INDEX IF NOT EXISTS recipients_user_idx       ON message_recipients(user_id);

PRAGMA user_version = 1;
";
