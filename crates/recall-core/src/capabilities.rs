//! Runtime capability detection for a memory store.
//!
//! Probes the open SQLite connection to find out which retrieval legs can run
//! and what the search engine falls back to when one cannot. Every probe is
//! infallible from the caller's perspective: it returns a `bool`, logs the
//! outcome at `debug!`, and never propagates errors.

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::db::{fts::FTS_TABLE, table_exists, vector};

/// Runtime capability flags for one store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    /// `memories_fts` exists, so lexical search is ranked.
    pub fts5: bool,
    /// sqlite-vec answers `vec_version()`.
    pub vectors: bool,
    /// `memories.embedding` exists.
    pub embedding_column: bool,
    /// Rows with a stored embedding. Zero when the column is missing.
    pub embedded_rows: i64,
}

impl Capabilities {
    /// Whether the vector leg can run against this store.
    #[must_use]
    pub const fn vector_search(&self) -> bool {
        self.vectors && self.embedding_column
    }
}

/// Status of a single capability for user-visible display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityStatus {
    pub name: &'static str,
    pub available: bool,
    /// What search does instead when this capability is missing.
    pub fallback: &'static str,
}

/// Probe `db` for every optional capability.
#[must_use]
pub fn detect_capabilities(db: &Connection) -> Capabilities {
    let fts5 = table_exists(db, FTS_TABLE).unwrap_or_else(|e| {
        debug!(error = %e, "fts5 probe failed");
        false
    });
    let vectors = vector::vec_version(db).is_some();
    let embedding_column = vector::has_embedding_column(db).unwrap_or(false);
    let embedded_rows = if embedding_column {
        vector::embedded_row_count(db).unwrap_or(0)
    } else {
        0
    };

    let caps = Capabilities {
        fts5,
        vectors,
        embedding_column,
        embedded_rows,
    };
    debug!(?caps, "capability detection complete");
    caps
}

/// Describe which capabilities are active or missing, in a stable order.
///
/// `embedder_configured` reports whether an embedding provider is set up; the
/// store cannot know that on its own.
#[must_use]
pub fn describe_capabilities(
    caps: &Capabilities,
    embedder_configured: bool,
) -> Vec<CapabilityStatus> {
    vec![
        CapabilityStatus {
            name: "fts5",
            available: caps.fts5,
            fallback: "lexical search uses unranked substring matching",
        },
        CapabilityStatus {
            name: "vectors",
            available: caps.vectors,
            fallback: "semantic leg skipped, lexical ranking only",
        },
        CapabilityStatus {
            name: "embedding_column",
            available: caps.embedding_column,
            fallback: "semantic leg skipped, lexical ranking only",
        },
        CapabilityStatus {
            name: "embeddings",
            available: caps.embedded_rows > 0,
            fallback: "semantic leg returns no candidates until rows are embedded",
        },
        CapabilityStatus {
            name: "embedding_service",
            available: embedder_configured,
            fallback: "query embedding skipped, lexical ranking only",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_store;

    #[test]
    fn fresh_store_has_fts_and_vectors() {
        let (_dir, _path, conn) = temp_store();
        let caps = detect_capabilities(&conn);
        assert!(caps.fts5);
        assert!(caps.vectors);
        assert!(caps.embedding_column);
        assert!(caps.vector_search());
        assert_eq!(caps.embedded_rows, 0);
    }

    #[test]
    fn bare_connection_has_no_store_capabilities() {
        let conn = Connection::open_in_memory().expect("open");
        let caps = detect_capabilities(&conn);
        assert!(!caps.fts5);
        assert!(!caps.embedding_column);
        assert!(!caps.vector_search());
    }

    #[test]
    fn describe_is_stable_and_complete() {
        let caps = Capabilities {
            fts5: true,
            vectors: false,
            embedding_column: true,
            embedded_rows: 3,
        };
        let statuses = describe_capabilities(&caps, false);
        let names: Vec<&str> = statuses.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["fts5", "vectors", "embedding_column", "embeddings", "embedding_service"]
        );
        assert!(statuses[0].available);
        assert!(!statuses[1].available);
        assert!(statuses[3].available);
        assert!(!statuses[4].available);
        assert!(statuses.iter().all(|s| !s.fallback.is_empty()));
    }
}
