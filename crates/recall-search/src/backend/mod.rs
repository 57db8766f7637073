//! Storage backend seam.
//!
//! A backend answers three kinds of retrieval query (ranked lexical,
//! unranked substring, vector nearest-neighbour) and reports whether the
//! vector query can run at all. Vector search is optional: the default
//! implementations report it unsupported.

pub mod sqlite;

use recall_core::{ErrorCode, MemoryFilter, MemoryRow, StoreError};

pub use sqlite::SqliteBackend;

/// One row from a leg, in that leg's rank order.
pub type CandidateRecord = MemoryRow;

/// Why a backend call failed. The legs branch on the variant.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The store cannot be reached at all. Fatal for the lexical leg.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The lexical index is missing or rejected the query expression.
    #[error("lexical index unavailable: {0}")]
    IndexUnavailable(String),

    /// The backend does not implement this operation.
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),

    /// Any other query failure.
    #[error("query failed: {0}")]
    Query(String),
}

impl BackendError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Unreachable(_) => ErrorCode::StoreUnreachable,
            Self::IndexUnavailable(_) => ErrorCode::FtsIndexMissing,
            Self::Unsupported(_) => ErrorCode::VectorUnavailable,
            Self::Query(_) => ErrorCode::InternalUnexpected,
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Open { .. } => Self::Unreachable(err.to_string()),
            StoreError::MissingIndex(_) | StoreError::MalformedQuery(_) => {
                Self::IndexUnavailable(err.to_string())
            }
            StoreError::Sqlite(ref source) if is_connectivity_failure(source) => {
                Self::Unreachable(err.to_string())
            }
            StoreError::Sqlite(_) => Self::Query(err.to_string()),
        }
    }
}

/// SQLite failures that mean "this file is not a usable store" rather than
/// "this query went wrong".
fn is_connectivity_failure(err: &rusqlite::Error) -> bool {
    use rusqlite::ErrorCode as Code;
    matches!(
        err.sqlite_error_code(),
        Some(
            Code::CannotOpen
                | Code::NotADatabase
                | Code::PermissionDenied
                | Code::SystemIoFailure
                | Code::DatabaseCorrupt
        )
    )
}

/// Retrieval operations a storage backend exposes to the search engine.
///
/// Implementations must be shareable across the threads of one search call.
/// Every returned list is ordered best-first with unique ids.
pub trait Backend: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &'static str;

    /// Ranked keyword search.
    ///
    /// # Errors
    ///
    /// [`BackendError::IndexUnavailable`] when the index is missing or the
    /// query is malformed; [`BackendError::Unreachable`] when the store
    /// cannot be opened.
    fn lexical_search(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError>;

    /// Unranked case-insensitive substring match over the same filtered set.
    ///
    /// # Errors
    ///
    /// Any [`BackendError`]; there is no further fallback.
    fn substring_search(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError>;

    /// Nearest-neighbour search, closest first.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unsupported`] unless the backend overrides this.
    fn vector_search(
        &self,
        _vector: &[f32],
        _filter: &MemoryFilter,
        _limit: usize,
    ) -> Result<Vec<CandidateRecord>, BackendError> {
        Err(BackendError::Unsupported("vector search"))
    }

    /// Try the vector capability once. Failures read as `false`.
    fn probe_vector_capability(&self) -> bool {
        false
    }

    /// Identity/context text from the store's startup table.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unreachable`] when the store cannot be opened.
    fn startup(&self) -> Result<String, BackendError>;
}
