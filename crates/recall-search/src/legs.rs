//! The two retrieval legs.
//!
//! The lexical leg always produces a list: ranked when the index answers,
//! substring-matched when it does not. The vector leg either produces a list
//! or reports why it could not; the coordinator turns that into "leg absent".

use recall_core::MemoryFilter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendError, CandidateRecord};

/// How the lexical leg produced its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalMode {
    /// Relevance-ranked by the full-text index.
    Ranked,
    /// Unranked substring match; every row has the same nominal score.
    Substring,
}

#[derive(Debug, Clone)]
pub struct LexicalLeg {
    pub rows: Vec<CandidateRecord>,
    pub mode: LexicalMode,
}

/// Run the lexical leg, falling back to substring matching when the index is
/// missing or rejects the query.
///
/// # Errors
///
/// Any [`BackendError`] other than [`BackendError::IndexUnavailable`] from
/// the ranked query, or any error from the fallback itself.
pub fn run_lexical<B: Backend + ?Sized>(
    backend: &B,
    query: &str,
    filter: &MemoryFilter,
    limit: usize,
) -> Result<LexicalLeg, BackendError> {
    match backend.lexical_search(query, filter, limit) {
        Ok(rows) => {
            debug!(candidates = rows.len(), "lexical leg ranked");
            Ok(LexicalLeg {
                rows,
                mode: LexicalMode::Ranked,
            })
        }
        Err(BackendError::IndexUnavailable(reason)) => {
            warn!(%reason, "lexical index unavailable, using unranked substring match");
            let rows = backend.substring_search(query, filter, limit)?;
            debug!(candidates = rows.len(), "lexical leg substring fallback");
            Ok(LexicalLeg {
                rows,
                mode: LexicalMode::Substring,
            })
        }
        Err(other) => Err(other),
    }
}

/// Run the vector leg. The caller has already checked capability and
/// obtained `vector`.
///
/// # Errors
///
/// Whatever the backend reports; the caller treats every error as "leg
/// absent".
pub fn run_vector<B: Backend + ?Sized>(
    backend: &B,
    vector: &[f32],
    filter: &MemoryFilter,
    limit: usize,
) -> Result<Vec<CandidateRecord>, BackendError> {
    let rows = backend.vector_search(vector, filter, limit)?;
    debug!(candidates = rows.len(), "vector leg ranked");
    Ok(rows)
}
