//! SQLite backend: FTS5 for the lexical leg, sqlite-vec for the vector leg.
//!
//! Each call opens its own short-lived read-only connection. Search traffic
//! is low enough that pooling buys nothing, and a fresh connection means a
//! store replaced on disk is picked up by the next call.

use std::path::{Path, PathBuf};

use recall_core::MemoryFilter;
use recall_core::db::{fts, open_store_read_only, startup, vector};
use rusqlite::Connection;
use tracing::debug;

use super::{Backend, BackendError, CandidateRecord};

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, BackendError> {
        Ok(open_store_read_only(&self.path)?)
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn lexical_search(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError> {
        let conn = self.connect()?;
        Ok(fts::search_bm25(&conn, query, filter, limit)?)
    }

    fn substring_search(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError> {
        let conn = self.connect()?;
        Ok(fts::search_substring(&conn, query, filter, limit)?)
    }

    fn vector_search(
        &self,
        query: &[f32],
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError> {
        let conn = self.connect()?;
        Ok(vector::search_knn(&conn, query, filter, limit)?)
    }

    fn probe_vector_capability(&self) -> bool {
        match self.connect() {
            Ok(conn) => {
                let available = vector::vector_search_available(&conn);
                debug!(available, path = %self.path.display(), "sqlite vector probe");
                available
            }
            Err(e) => {
                debug!(error = %e, "sqlite vector probe could not open store");
                false
            }
        }
    }

    fn startup(&self) -> Result<String, BackendError> {
        let conn = self.connect()?;
        Ok(startup::load_startup(&conn)?)
    }
}
