//! Row and filter types shared by every retrieval query.

use serde::{Deserialize, Serialize};

/// One memory row as returned by a lexical or vector query.
///
/// Optional columns stay `None` here; presentation code decides how to
/// render absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRow {
    /// Stringified primary key.
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    /// Origin of the memory (usually the file it was imported from).
    pub source: Option<String>,
    pub content: Option<String>,
    /// Pre-condensed form of `content`, when ingestion produced one.
    pub content_pyramid: Option<String>,
    /// Leg-native score: BM25 rank, cosine distance, or the substring
    /// fallback's nominal `1.0`. Never comparable across legs.
    pub native_score: f64,
}

/// Predicates applied identically by every leg before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Include superseded and expired memories.
    pub include_inactive: bool,
}

impl MemoryFilter {
    #[must_use]
    pub fn with_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            include_inactive: false,
        }
    }
}
