//! Versioned entity store
//!
//! Each versioned entity is split across two tables: a head row holding the
//! id, status, immutable foreign keys and a `current_version` pointer, and an
//! append-only version table holding one row per `(entity, version)`.
//!
//! Edits and rollbacks never touch existing version rows. Both bump the
//! pointer first (which takes the row's write lock inside the caller's
//! transaction) and then insert a new row under the bumped number, so the
//! version sequence of an entity stays contiguous and unique.

use std::marker::PhantomData;

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::error::{Result, TenderError};
use crate::core::identity::{self, EntityPrefix};
use crate::core::page::Page;

/// Columns every head row starts with: id, created_at, current_version
pub const FIXED_COLUMNS: usize = 3;

/// The fields that live in the version table
pub trait VersionFields: Sized + Clone {
    /// Column names, in the order `from_row` and `values` use
    const COLUMNS: &'static [&'static str];

    /// Partial update; unset or empty members keep the previous value
    type Patch;

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;

    fn values(&self) -> Vec<Value>;

    /// Fill the new version from `self` (the previous one) and `patch`
    fn merge(self, patch: &Self::Patch) -> Self;
}

/// A head table + version table pair
pub trait Versioned: Sized {
    const PREFIX: EntityPrefix;
    const TABLE: &'static str;
    const VERSION_TABLE: &'static str;
    /// Foreign key column in the version table pointing at the head row
    const OWNER_COLUMN: &'static str;
    /// Mutable and immutable head columns after the fixed ones
    const HEAD_COLUMNS: &'static [&'static str];

    type Head;
    type Status: ToString;
    type Fields: VersionFields;

    /// Values for `HEAD_COLUMNS` at creation time
    fn head_values(head: &Self::Head) -> Vec<Value>;

    /// Decode `id, created_at, current_version, HEAD_COLUMNS.., Fields::COLUMNS..`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn not_found() -> TenderError;

    /// Index of the first version field in a joined row
    fn fields_offset() -> usize {
        FIXED_COLUMNS + Self::HEAD_COLUMNS.len()
    }
}

/// One immutable row of the version table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord<F> {
    pub version: u32,
    #[serde(flatten)]
    pub fields: F,
}

/// Versioned store operations for one entity kind, bound to a connection
///
/// Writers must run inside an immediate transaction (see
/// [`Store::write`](super::Store::write)).
pub struct Versions<'c, E> {
    conn: &'c Connection,
    kind: PhantomData<E>,
}

impl<'c, E: Versioned> Versions<'c, E> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            kind: PhantomData,
        }
    }

    pub(crate) fn conn(&self) -> &'c Connection {
        self.conn
    }

    fn select_current() -> String {
        let columns: Vec<String> = ["e.id", "e.created_at", "e.current_version"]
            .into_iter()
            .map(String::from)
            .chain(E::HEAD_COLUMNS.iter().map(|c| format!("e.{}", c)))
            .chain(E::Fields::COLUMNS.iter().map(|c| format!("v.{}", c)))
            .collect();

        format!(
            "SELECT {} FROM {} e JOIN {} v ON v.{} = e.id AND v.version = e.current_version",
            columns.join(", "),
            E::TABLE,
            E::VERSION_TABLE,
            E::OWNER_COLUMN
        )
    }

    /// Insert a head row at version 1 together with its first version row
    pub fn create(&self, head: &E::Head, fields: &E::Fields) -> Result<String> {
        let id = identity::generate(E::PREFIX);

        let mut values = vec![
            Value::Text(id.clone()),
            Value::Text(Utc::now().to_rfc3339()),
            Value::Integer(1),
        ];
        values.extend(E::head_values(head));

        let sql = format!(
            "INSERT INTO {} (id, created_at, current_version, {}) VALUES ({})",
            E::TABLE,
            E::HEAD_COLUMNS.join(", "),
            placeholders(values.len())
        );
        self.conn.execute(&sql, params_from_iter(values))?;
        self.insert_version(&id, 1, fields)?;

        Ok(id)
    }

    /// The entity joined with its current version, if it exists
    pub fn get(&self, id: &str) -> Result<Option<E>> {
        let sql = format!("{} WHERE e.id = ?1", Self::select_current());
        Ok(self.conn.query_row(&sql, [id], E::from_row).optional()?)
    }

    /// Like [`get`](Self::get) but a missing entity is an error
    pub fn current(&self, id: &str) -> Result<E> {
        self.get(id)?.ok_or_else(E::not_found)
    }

    /// Current views matching `filter`, ordered by name then id
    ///
    /// `filter` is a SQL condition over the `e`/`v` aliases using numbered
    /// placeholders `?1..?n` for `params`.
    pub fn list(&self, filter: &str, params: Vec<Value>, page: Page) -> Result<Vec<E>> {
        let n = params.len();
        let sql = format!(
            "{} WHERE {} ORDER BY v.name ASC, e.id ASC LIMIT ?{} OFFSET ?{}",
            Self::select_current(),
            filter,
            n + 1,
            n + 2
        );

        let mut values = params;
        values.push(Value::Integer(i64::from(page.limit)));
        values.push(Value::Integer(i64::from(page.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), E::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Write a new version built from the previous one and `patch`
    ///
    /// Returns the new version number.
    pub fn edit_current(
        &self,
        id: &str,
        patch: &<E::Fields as VersionFields>::Patch,
    ) -> Result<u32> {
        let version = self.bump(id)?;
        let previous = self
            .record(id, version - 1)?
            .ok_or(TenderError::NoSuchVersion)?;

        self.insert_version(id, version, &previous.fields.merge(patch))?;
        Ok(version)
    }

    /// Copy the record at `target` forward as a new current version
    ///
    /// The row at `target` stays where it is. Returns the new version number.
    pub fn rollback_to(&self, id: &str, target: u32) -> Result<u32> {
        let record = self.record(id, target)?.ok_or(TenderError::NoSuchVersion)?;
        let version = self.bump(id)?;

        self.insert_version(id, version, &record.fields)?;
        Ok(version)
    }

    /// A single version row
    pub fn record(&self, id: &str, version: u32) -> Result<Option<VersionRecord<E::Fields>>> {
        let sql = format!(
            "SELECT version, {} FROM {} WHERE {} = ?1 AND version = ?2",
            E::Fields::COLUMNS.join(", "),
            E::VERSION_TABLE,
            E::OWNER_COLUMN
        );

        let record = self
            .conn
            .query_row(&sql, (id, version), read_record::<E::Fields>)
            .optional()?;
        Ok(record)
    }

    /// Every version row of the entity, oldest first
    pub fn history(&self, id: &str) -> Result<Vec<VersionRecord<E::Fields>>> {
        let sql = format!(
            "SELECT version, {} FROM {} WHERE {} = ?1 ORDER BY version ASC",
            E::Fields::COLUMNS.join(", "),
            E::VERSION_TABLE,
            E::OWNER_COLUMN
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([id], read_record::<E::Fields>)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overwrite the head row's status
    pub fn set_status(&self, id: &str, status: E::Status) -> Result<()> {
        let sql = format!("UPDATE {} SET status = ?2 WHERE id = ?1", E::TABLE);
        let changed = self.conn.execute(&sql, (id, status.to_string()))?;
        if changed == 0 {
            return Err(E::not_found());
        }
        Ok(())
    }

    fn bump(&self, id: &str) -> Result<u32> {
        let sql = format!(
            "UPDATE {} SET current_version = current_version + 1 WHERE id = ?1 RETURNING current_version",
            E::TABLE
        );

        self.conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()?
            .ok_or_else(E::not_found)
    }

    fn insert_version(&self, id: &str, version: u32, fields: &E::Fields) -> Result<()> {
        let mut values = vec![Value::Text(id.to_string()), Value::Integer(i64::from(version))];
        values.extend(fields.values());

        let sql = format!(
            "INSERT INTO {} ({}, version, {}) VALUES ({})",
            E::VERSION_TABLE,
            E::OWNER_COLUMN,
            E::Fields::COLUMNS.join(", "),
            placeholders(values.len())
        );
        self.conn.execute(&sql, params_from_iter(values))?;
        Ok(())
    }
}

fn read_record<F: VersionFields>(row: &Row<'_>) -> rusqlite::Result<VersionRecord<F>> {
    Ok(VersionRecord {
        version: row.get(0)?,
        fields: F::from_row(row, 1)?,
    })
}

/// `?1, ?2, ..., ?n`
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Treat an empty string the same as an absent value
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
