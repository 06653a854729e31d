//! SQLite-backed store
//!
//! One [`Store`] owns one connection. Reads go through [`Store::read`];
//! anything that writes goes through [`Store::write`], which wraps the closure
//! in a `BEGIN IMMEDIATE` transaction. Immediate transactions take the
//! database write lock up front, so two writers on the same file (from this
//! process or another) run one after the other. The busy timeout decides how
//! long the second one waits.

mod directory;
mod ledger;
mod reviews;
pub mod schema;
mod serialize;
pub mod versions;


use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::Result;

pub use directory::{Directory, SqlDirectory};
pub use ledger::ApprovalLedger;
pub use reviews::Reviews;
pub use versions::{VersionFields, VersionRecord, Versioned, Versions};

/// Default wait for a locked database
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Row counts and engine details reported by `db ping`
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub sqlite_version: String,
    pub schema_version: i32,
    pub employees: i64,
    pub organizations: i64,
    pub tenders: i64,
    pub bids: i64,
    pub reviews: i64,
}

pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "opened database");

        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    /// Open the database named by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.database, config.busy_timeout())
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run read-only queries against the connection
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock();
        f(&conn)
    }

    /// Run `f` inside an immediate transaction
    ///
    /// The transaction commits when `f` returns `Ok`. On `Err` it is dropped,
    /// which rolls back everything `f` wrote.
    pub fn write<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Check the connection and report table sizes
    pub fn ping(&self) -> Result<StoreStats> {
        self.read(|conn| {
            let count = |table: &str| -> rusqlite::Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
            };

            let stats = StoreStats {
                sqlite_version: conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))?,
                schema_version: schema::version(conn)?,
                employees: count("employee")?,
                organizations: count("organization")?,
                tenders: count("tender")?,
                bids: count("bid")?,
                reviews: count("review")?,
            };
            info!(tenders = stats.tenders, bids = stats.bids, "database reachable");
            Ok(stats)
        })
    }
}
