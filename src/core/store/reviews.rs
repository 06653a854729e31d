//! Bid feedback storage

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::core::error::Result;
use crate::core::identity::{self, EntityPrefix};
use crate::core::page::Page;
use crate::entities::review::Review;

use super::versions::placeholders;

pub struct Reviews<'c> {
    conn: &'c Connection,
}

impl<'c> Reviews<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(
        &self,
        bid_id: &str,
        author_id: &str,
        receiver_id: &str,
        description: &str,
    ) -> Result<Review> {
        let review = Review {
            id: identity::generate(EntityPrefix::Rev),
            description: description.to_string(),
            created_at: Utc::now(),
            author_id: author_id.to_string(),
            receiver_id: receiver_id.to_string(),
            bid_id: bid_id.to_string(),
        };

        self.conn.execute(
            "INSERT INTO review (id, description, created_at, author_id, receiver_id, bid_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.id,
                review.description,
                review.created_at.to_rfc3339(),
                review.author_id,
                review.receiver_id,
                review.bid_id
            ],
        )?;
        Ok(review)
    }

    /// Every review addressed to any of `receiver_ids`, ordered by description
    pub fn received_by(&self, receiver_ids: &[String], page: Page) -> Result<Vec<Review>> {
        if receiver_ids.is_empty() {
            return Ok(Vec::new());
        }

        let n = receiver_ids.len();
        let sql = format!(
            "SELECT {} FROM review WHERE receiver_id IN ({})
             ORDER BY description ASC, id ASC LIMIT ?{} OFFSET ?{}",
            Review::COLUMNS,
            placeholders(n),
            n + 1,
            n + 2
        );

        let mut values: Vec<Value> = receiver_ids.iter().cloned().map(Value::Text).collect();
        values.push(Value::Integer(i64::from(page.limit)));
        values.push(Value::Integer(i64::from(page.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), Review::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
