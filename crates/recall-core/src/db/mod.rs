//! SQLite memory store utilities.
//!
//! Two ways in:
//! - [`open_store`] creates the file if needed, applies pragmas, and migrates.
//!   Used by `recall init` and by tests that seed data.
//! - [`open_store_read_only`] opens an existing store for one retrieval call.
//!   It never creates a file, so a missing store surfaces as
//!   [`StoreError::Open`].
//!
//! Both register the sqlite-vec auto-extension first so vector functions are
//! present whenever the extension is available in this build.

pub mod fts;
pub mod migrations;
pub mod schema;
pub mod startup;
pub mod vector;

use crate::error::StoreError;
use crate::model::{MemoryFilter, MemoryRow};
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Row, types::Value};
use std::{path::Path, time::Duration};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Columns selected by every retrieval query, in [`row_to_memory`] order.
pub(crate) const MEMORY_COLUMNS: &str = "CAST(m.id AS TEXT), m.title, m.summary, m.category, \
     m.source_file, m.content, m.content_pyramid";

/// Open (or create) the store, apply runtime pragmas, and migrate the schema
/// to the latest version.
///
/// # Errors
///
/// Returns an error if opening, configuring, or migrating the database fails.
pub fn open_store(path: &Path) -> Result<Connection> {
    register_vector_extension();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn =
        Connection::open(path).with_context(|| format!("open store {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;

    Ok(conn)
}

/// Open an existing store read-only.
///
/// # Errors
///
/// Returns [`StoreError::Open`] when the file does not exist or SQLite cannot
/// open it.
pub fn open_store_read_only(path: &Path) -> Result<Connection, StoreError> {
    register_vector_extension();

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(conn)
}

/// Cheap liveness check: the file opens and answers `SELECT 1`.
#[must_use]
pub fn ping(path: &Path) -> bool {
    let Ok(conn) = open_store_read_only(path) else {
        return false;
    };
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .is_ok_and(|one| one == 1)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn register_vector_extension() {
    if let Err(reason) = recall_sqlite_vec::register_auto_extension() {
        tracing::debug!(%reason, "sqlite-vec not registered");
    }
}

/// Append the shared filter predicates for alias `m` and push their bound
/// values onto `params`.
///
/// Every leg calls this so lexical, substring, and vector queries rank the
/// same candidate pool.
pub(crate) fn push_filter_sql(filter: &MemoryFilter, sql: &mut String, params: &mut Vec<Value>) {
    if let Some(category) = &filter.category {
        sql.push_str(" AND m.category = ?");
        params.push(Value::Text(category.clone()));
    }
    if !filter.include_inactive {
        sql.push_str(
            " AND m.superseded_by IS NULL \
             AND (m.valid_to IS NULL OR m.valid_to > CAST(strftime('%s', 'now') AS INTEGER))",
        );
    }
}

/// Map a row selected with [`MEMORY_COLUMNS`] followed by a score column.
pub(crate) fn row_to_memory(row: &Row<'_>) -> rusqlite::Result<MemoryRow> {
    Ok(MemoryRow {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        category: row.get(3)?,
        source: row.get(4)?,
        content: row.get(5)?,
        content_pyramid: row.get(6)?,
        native_score: row.get(7)?,
    })
}

/// Whether `table` exists in the main schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )
}
