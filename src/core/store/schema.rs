//! Database schema

use rusqlite::Connection;
use tracing::debug;

use crate::core::error::Result;

/// Bumped whenever the table layout below changes
pub const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS employee (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    type TEXT NOT NULL DEFAULT 'LLC',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization_responsible (
    organization_id TEXT NOT NULL REFERENCES organization(id),
    user_id TEXT NOT NULL REFERENCES employee(id),
    UNIQUE (organization_id, user_id)
);

CREATE TABLE IF NOT EXISTS tender (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    current_version INTEGER NOT NULL CHECK (current_version >= 1),
    status TEXT NOT NULL,
    organization_id TEXT NOT NULL REFERENCES organization(id)
);

CREATE TABLE IF NOT EXISTS tender_version (
    tender_id TEXT NOT NULL REFERENCES tender(id),
    version INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    service_type TEXT NOT NULL,
    UNIQUE (tender_id, version)
);

CREATE TABLE IF NOT EXISTS bid (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    current_version INTEGER NOT NULL CHECK (current_version >= 1),
    status TEXT NOT NULL,
    decision TEXT,
    tender_id TEXT NOT NULL REFERENCES tender(id),
    author_type TEXT NOT NULL,
    author_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bid_version (
    bid_id TEXT NOT NULL REFERENCES bid(id),
    version INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    UNIQUE (bid_id, version)
);

CREATE TABLE IF NOT EXISTS approves (
    bid_id TEXT NOT NULL REFERENCES bid(id),
    employee_id TEXT NOT NULL REFERENCES employee(id),
    UNIQUE (bid_id, employee_id)
);

CREATE TABLE IF NOT EXISTS review (
    id TEXT PRIMARY KEY,
    bid_id TEXT NOT NULL REFERENCES bid(id),
    author_id TEXT NOT NULL REFERENCES employee(id),
    receiver_id TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tender_org ON tender(organization_id);
CREATE INDEX IF NOT EXISTS idx_tender_status ON tender(status);
CREATE INDEX IF NOT EXISTS idx_bid_tender ON bid(tender_id);
CREATE INDEX IF NOT EXISTS idx_bid_author ON bid(author_id);
CREATE INDEX IF NOT EXISTS idx_review_receiver ON review(receiver_id);
"#;

/// Create missing tables and stamp the schema version
pub fn migrate(conn: &Connection) -> Result<()> {
    let current: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    debug!(current, target = SCHEMA_VERSION, "checking schema");

    conn.execute_batch(SCHEMA)?;
    if current != SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

/// Stamped schema version of an open database
pub fn version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
