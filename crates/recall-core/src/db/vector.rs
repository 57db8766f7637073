//! Nearest-neighbour queries over `memories.embedding` via sqlite-vec.
//!
//! Embeddings are stored as raw little-endian f32 BLOBs, the format
//! sqlite-vec reads natively. Rows whose stored vector has a different
//! dimension than the query are skipped rather than failing the query.

use rusqlite::{Connection, params_from_iter, types::Value};

use super::{MEMORY_COLUMNS, push_filter_sql, row_to_memory};
use crate::error::StoreError;
use crate::model::{MemoryFilter, MemoryRow};

/// Encode a vector as the little-endian f32 BLOB sqlite-vec expects.
#[must_use]
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Return memories ordered by ascending cosine distance to `query`.
///
/// `native_score` carries the distance (smaller is closer). Ties are broken
/// by ascending id.
///
/// # Errors
///
/// Returns [`StoreError::Sqlite`] if sqlite-vec is not loaded, the
/// `embedding` column is missing, or the query otherwise fails.
pub fn search_knn(
    conn: &Connection,
    query: &[f32],
    filter: &MemoryFilter,
    limit: usize,
) -> Result<Vec<MemoryRow>, StoreError> {
    let dimensions = i64::try_from(query.len()).unwrap_or(i64::MAX);

    let mut sql = format!(
        "SELECT {MEMORY_COLUMNS}, vec_distance_cosine(m.embedding, ?) AS distance \
         FROM memories m \
         WHERE m.embedding IS NOT NULL AND vec_length(m.embedding) = ?"
    );
    let mut params = vec![
        Value::Blob(encode_embedding(query)),
        Value::Integer(dimensions),
    ];
    push_filter_sql(filter, &mut sql, &mut params);
    sql.push_str(" ORDER BY distance, m.id LIMIT ?");
    params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), row_to_memory)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// sqlite-vec version string, or `None` when the extension is not loaded on
/// this connection.
#[must_use]
pub fn vec_version(conn: &Connection) -> Option<String> {
    conn.query_row("SELECT vec_version()", [], |row| row.get(0))
        .ok()
}

/// Whether `memories` has an `embedding` column.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn has_embedding_column(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info('memories') WHERE name = 'embedding')",
        [],
        |row| row.get(0),
    )
}

/// Whether this connection can serve vector queries: sqlite-vec answers and
/// the embedding column exists. Any failure reads as `false`.
#[must_use]
pub fn vector_search_available(conn: &Connection) -> bool {
    vec_version(conn).is_some() && has_embedding_column(conn).unwrap_or(false)
}

/// Number of memories with a stored embedding.
///
/// # Errors
///
/// Returns an error if the `memories` table or `embedding` column is missing.
pub fn embedded_row_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM memories WHERE embedding IS NOT NULL",
        [],
        |row| row.get(0),
    )
}
