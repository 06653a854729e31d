//! Review entity - feedback left on a bid for its author

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Immutable feedback record
///
/// `receiver_id` is the bid's `author_id` at the time the feedback was left,
/// so it names an organization for organization-authored bids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub receiver_id: String,
    pub bid_id: String,
}

impl Review {
    pub(crate) const COLUMNS: &'static str =
        "id, description, created_at, author_id, receiver_id, bid_id";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            created_at: row.get(2)?,
            author_id: row.get(3)?,
            receiver_id: row.get(4)?,
            bid_id: row.get(5)?,
        })
    }
}
