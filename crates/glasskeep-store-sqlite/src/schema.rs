//! SQL schema for the Glasskeep SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS customers (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    name                    TEXT NOT NULL,
    contact                 TEXT NOT NULL,
    photo_id                BLOB,
    subscription_start_date TEXT NOT NULL,    -- ISO 8601 date; immutable
    remaining_changes       INTEGER NOT NULL CHECK (remaining_changes >= 0),
    validity_period         INTEGER NOT NULL, -- days; fixed by plan
    family_members          TEXT NOT NULL DEFAULT '[]',  -- JSON array of names
    plan                    TEXT NOT NULL     -- literal plan label
);

-- Change log is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- customer_id carries no FOREIGN KEY; rows may outlive their customer.
CREATE TABLE IF NOT EXISTS changes_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    change_date TEXT NOT NULL     -- ISO 8601 date
);

CREATE INDEX IF NOT EXISTS changes_log_customer_idx ON changes_log(customer_id);

PRAGMA user_version = 1;
";
