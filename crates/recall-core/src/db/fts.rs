//! FTS5 full-text search with BM25 ranking, plus the substring fallback used
//! when the index is missing or rejects a query.
//!
//! # Column Weights (BM25)
//!
//! | Column  | Weight | Rationale                          |
//! |---------|--------|------------------------------------|
//! | title   | 3.0    | Short, most specific               |
//! | summary | 2.0    | Condensed restatement of content   |
//! | content | 1.0    | Full text, lowest signal density   |
//!
//! # Query syntax
//!
//! The user query is passed to `MATCH` untouched, so FTS5 operators work:
//! `auth*`, `"exact phrase"`, `watson AND NOT moriarty`. An expression FTS5
//! cannot parse is reported as [`StoreError::MalformedQuery`], which callers
//! treat the same as a missing index.

use rusqlite::{Connection, params_from_iter, types::Value};

use super::{MEMORY_COLUMNS, push_filter_sql, row_to_memory};
use crate::error::StoreError;
use crate::model::{MemoryFilter, MemoryRow};

pub const BM25_WEIGHT_TITLE: f64 = 3.0;
pub const BM25_WEIGHT_SUMMARY: f64 = 2.0;
pub const BM25_WEIGHT_CONTENT: f64 = 1.0;

/// Name of the FTS5 virtual table.
pub const FTS_TABLE: &str = "memories_fts";

/// Nominal score given to every substring-fallback match.
pub const SUBSTRING_SCORE: f64 = 1.0;

/// Ranked lexical search over `memories_fts`.
///
/// Results are best-first (most negative BM25 first); equal ranks fall back
/// to ascending id so the order is deterministic.
///
/// # Errors
///
/// [`StoreError::MissingIndex`] if the FTS table does not exist,
/// [`StoreError::MalformedQuery`] if FTS5 rejects `query`, and
/// [`StoreError::Sqlite`] for anything else.
pub fn search_bm25(
    conn: &Connection,
    query: &str,
    filter: &MemoryFilter,
    limit: usize,
) -> Result<Vec<MemoryRow>, StoreError> {
    let mut sql = format!(
        "SELECT {MEMORY_COLUMNS}, bm25(memories_fts, ?, ?, ?) AS rank \
         FROM memories_fts \
         JOIN memories m ON m.id = memories_fts.rowid \
         WHERE memories_fts MATCH ?"
    );
    let mut params = vec![
        Value::Real(BM25_WEIGHT_TITLE),
        Value::Real(BM25_WEIGHT_SUMMARY),
        Value::Real(BM25_WEIGHT_CONTENT),
        Value::Text(query.to_string()),
    ];
    push_filter_sql(filter, &mut sql, &mut params);
    sql.push_str(" ORDER BY rank, m.id LIMIT ?");
    params.push(limit_value(limit));

    // Schema problems surface while preparing; FTS5 parses the MATCH
    // expression only once the statement runs.
    let mut stmt = conn.prepare(&sql).map_err(classify_schema_error)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), row_to_memory)
        .and_then(|mapped| mapped.collect())
        .map_err(classify_match_error)?;
    Ok(rows)
}

/// Unranked case-insensitive substring match over title, summary, content,
/// and the condensed content, with the same filters as [`search_bm25`].
///
/// Rows come back in id order, each scored [`SUBSTRING_SCORE`].
///
/// # Errors
///
/// Returns [`StoreError::Sqlite`] if the `memories` table cannot be queried.
pub fn search_substring(
    conn: &Connection,
    query: &str,
    filter: &MemoryFilter,
    limit: usize,
) -> Result<Vec<MemoryRow>, StoreError> {
    let pattern = Value::Text(format!("%{}%", escape_like(query)));

    let mut sql = format!(
        "SELECT {MEMORY_COLUMNS}, {SUBSTRING_SCORE:.1} \
         FROM memories m \
         WHERE (m.title LIKE ? ESCAPE '\\' \
             OR m.summary LIKE ? ESCAPE '\\' \
             OR m.content LIKE ? ESCAPE '\\' \
             OR m.content_pyramid LIKE ? ESCAPE '\\')"
    );
    let mut params = vec![pattern.clone(), pattern.clone(), pattern.clone(), pattern];
    push_filter_sql(filter, &mut sql, &mut params);
    sql.push_str(" ORDER BY m.id LIMIT ?");
    params.push(limit_value(limit));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), row_to_memory)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Rebuild the external-content index from `memories`.
///
/// Needed after rows were written with triggers absent, e.g. a store
/// populated by another tool before `recall init` ran.
///
/// # Errors
///
/// Returns an error if the FTS table is missing or the rebuild fails.
pub fn rebuild_fts_index(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("INSERT INTO memories_fts(memories_fts) VALUES('rebuild')", [])
        .map(|_| ())
        .map_err(classify_schema_error)
}

fn limit_value(limit: usize) -> Value {
    Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn classify_schema_error(err: rusqlite::Error) -> StoreError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();

    if lower.contains("no such table") || lower.contains("no such module") {
        StoreError::MissingIndex(message)
    } else {
        StoreError::Sqlite(err)
    }
}

fn classify_match_error(err: rusqlite::Error) -> StoreError {
    let message = err.to_string();
    let lower = message.to_ascii_lowercase();

    if lower.contains("fts5")
        || lower.contains("syntax error")
        || lower.contains("no such column")
        || lower.contains("unterminated string")
    {
        StoreError::MalformedQuery(message)
    } else {
        StoreError::Sqlite(err)
    }
}
