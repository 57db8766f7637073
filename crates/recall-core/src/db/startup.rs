//! Identity/context text returned at the start of an agent session.

use rusqlite::Connection;

use super::table_exists;
use crate::error::StoreError;

/// Concatenate non-empty `startup` rows, ordered by priority then key, one
/// per line. A store without a `startup` table yields an empty string.
///
/// # Errors
///
/// Returns [`StoreError::Sqlite`] if the table exists but cannot be read.
pub fn load_startup(conn: &Connection) -> Result<String, StoreError> {
    if !table_exists(conn, "startup")? {
        tracing::debug!("store has no startup table");
        return Ok(String::new());
    }

    let mut stmt = conn.prepare(
        "SELECT content FROM startup \
         WHERE content IS NOT NULL AND content <> '' \
         ORDER BY priority, key",
    )?;
    let parts = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(parts.join("\n"))
}
