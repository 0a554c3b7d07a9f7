//! SQL schema for the NodeWiz SQLite store.
//!
//! Executed at connection startup. The version is tracked with
//! `PRAGMA user_version` so later migrations can be gated on it.

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Write-once: rows are inserted by the contact form and never updated.
CREATE TABLE IF NOT EXISTS contact_submissions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL CHECK (length(name) <= 100),
    email         TEXT NOT NULL CHECK (length(email) <= 254),
    company       TEXT NOT NULL DEFAULT '' CHECK (length(company) <= 100),
    message       TEXT NOT NULL,
    submitted_at  TEXT NOT NULL    -- RFC 3339 UTC, microseconds; server-assigned
);

CREATE TABLE IF NOT EXISTS testimonials (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    client_name       TEXT NOT NULL CHECK (length(client_name) <= 100),
    company           TEXT NOT NULL CHECK (length(company) <= 100),
    position          TEXT NOT NULL DEFAULT '' CHECK (length(position) <= 100),
    testimonial_text  TEXT NOT NULL,
    rating            INTEGER NOT NULL DEFAULT 5 CHECK (rating BETWEEN 1 AND 5),
    is_featured       INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_submitted_idx ON contact_submissions(submitted_at);
CREATE INDEX IF NOT EXISTS testimonials_featured_idx ON testimonials(is_featured, created_at);

PRAGMA user_version = 1;
";
