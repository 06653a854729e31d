//! Approval ledger
//!
//! Pending approve votes per bid. Entries only exist while a bid is still
//! short of its quorum; the whole set is cleared when a decision becomes
//! final.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::Result;

pub struct ApprovalLedger<'c> {
    conn: &'c Connection,
}

impl<'c> ApprovalLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn has_voted(&self, bid_id: &str, employee_id: &str) -> Result<bool> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM approves WHERE bid_id = ?1 AND employee_id = ?2",
                params![bid_id, employee_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    /// Number of pending approve votes
    pub fn count(&self, bid_id: &str) -> Result<u32> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM approves WHERE bid_id = ?1",
            [bid_id],
            |row| row.get(0),
        )?)
    }

    pub fn record(&self, bid_id: &str, employee_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO approves (bid_id, employee_id) VALUES (?1, ?2)",
            params![bid_id, employee_id],
        )?;
        Ok(())
    }

    /// Drop every pending vote on the bid, returning how many there were
    pub fn clear(&self, bid_id: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM approves WHERE bid_id = ?1", [bid_id])?)
    }
}
