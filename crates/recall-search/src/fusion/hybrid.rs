//! Hybrid search orchestration.
//!
//! Stages, none retried:
//! 1. decide whether the vector leg is wanted, probing capability once per
//!    coordinator
//! 2. run the lexical leg, while the query embedding is fetched on a scoped
//!    thread
//! 3. run the vector leg if an embedding arrived
//! 4. fuse both lists with RRF and shape the top `n`
//!
//! Only a lexical failure that is not an index problem fails the call. Every
//! vector-side failure becomes a [`VectorOutcome::Skipped`] in the report.

use std::collections::HashMap;

use anyhow::{Context, Result, ensure};
use recall_core::config::SearchConfig;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, CandidateRecord};
use crate::capability::{BackendCapabilities, CapabilityCache, VectorCapability};
use crate::fusion::rrf::fuse;
use crate::legs::{LexicalMode, run_lexical, run_vector};
use crate::query::SearchQuery;
use crate::semantic::Embedder;
use crate::shape::{ResultRecord, shape};

/// Why the vector leg did not contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Semantic search is off in config or for this query.
    Disabled,
    /// No embedding provider is configured.
    NoEmbedder,
    /// The backend cannot run vector queries.
    CapabilityUnavailable,
    /// The embedding service gave no vector.
    EmbeddingUnavailable,
    /// The backend's vector query failed.
    SearchFailed,
    /// Zero results were requested, so no leg ran.
    ZeroLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VectorOutcome {
    Ran,
    Skipped(SkipReason),
}

/// How a search was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReport {
    pub lexical_mode: LexicalMode,
    pub lexical_candidates: usize,
    pub vector: VectorOutcome,
    pub vector_candidates: usize,
    /// Cached capability state after this search.
    pub capability: VectorCapability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<ResultRecord>,
    pub report: SearchReport,
}

/// Runs hybrid searches against one backend session.
///
/// The capability probe result lives as long as the coordinator.
pub struct SearchCoordinator<B> {
    backend: B,
    embedder: Option<Box<dyn Embedder>>,
    capability: CapabilityCache,
    config: SearchConfig,
}

impl<B: Backend> SearchCoordinator<B> {
    #[must_use]
    pub fn new(backend: B, config: SearchConfig) -> Self {
        Self {
            backend,
            embedder: None,
            capability: CapabilityCache::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_embedder(mut self, embedder: Option<Box<dyn Embedder>>) -> Self {
        self.embedder = embedder;
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Capabilities of this session, probing the backend on first use.
    #[must_use]
    pub fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::from_state(self.vector_capability())
    }

    fn vector_capability(&self) -> VectorCapability {
        self.capability
            .get_or_probe(|| self.backend.probe_vector_capability())
    }

    /// Search and return shaped results.
    ///
    /// # Errors
    ///
    /// Fails when the query text is blank or the lexical leg cannot reach the
    /// store.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<ResultRecord>> {
        Ok(self.search_with_report(query)?.results)
    }

    /// Search and also report how each leg behaved.
    ///
    /// # Errors
    ///
    /// See [`SearchCoordinator::search`].
    #[instrument(skip_all, fields(n = query.limit, category = ?query.filter.category))]
    pub fn search_with_report(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        ensure!(!query.text.trim().is_empty(), "search query is empty");

        if query.limit == 0 {
            return Ok(SearchOutcome {
                results: Vec::new(),
                report: SearchReport {
                    lexical_mode: LexicalMode::Ranked,
                    lexical_candidates: 0,
                    vector: VectorOutcome::Skipped(SkipReason::ZeroLimit),
                    vector_candidates: 0,
                    capability: self.capability.get(),
                },
            });
        }

        let pool = self.config.candidate_pool.max(query.limit);
        let plan = self.vector_plan(query);
        if let Err(reason) = plan {
            debug!(?reason, "vector leg not attempted");
        }

        let (lexical, embedding) = std::thread::scope(|scope| {
            let embed_task = plan.ok().map(|e| scope.spawn(move || e.embed(&query.text)));
            let lexical = run_lexical(&self.backend, &query.text, &query.filter, pool);
            let embedding = embed_task.map(|task| {
                task.join().unwrap_or_else(|_| {
                    warn!("embedding task panicked, vector leg skipped");
                    None
                })
            });
            (lexical, embedding)
        });

        let lexical = lexical.context("lexical search failed")?;

        let (vector_rows, vector) = match (plan, embedding) {
            (Err(reason), _) => (Vec::new(), VectorOutcome::Skipped(reason)),
            (Ok(_), None | Some(None)) => {
                debug!("no query embedding, vector leg skipped");
                (
                    Vec::new(),
                    VectorOutcome::Skipped(SkipReason::EmbeddingUnavailable),
                )
            }
            (Ok(_), Some(Some(vector))) => {
                match run_vector(&self.backend, &vector, &query.filter, pool) {
                    Ok(rows) => (rows, VectorOutcome::Ran),
                    Err(e) => {
                        warn!("vector leg failed, using lexical ranking only: {e}");
                        (Vec::new(), VectorOutcome::Skipped(SkipReason::SearchFailed))
                    }
                }
            }
        };

        let lexical_ids: Vec<&str> = lexical.rows.iter().map(|r| r.id.as_str()).collect();
        let vector_ids: Vec<&str> = vector_rows.iter().map(|r| r.id.as_str()).collect();
        let fused = fuse(&lexical_ids, &vector_ids, query.limit, self.config.rrf_k);

        let report = SearchReport {
            lexical_mode: lexical.mode,
            lexical_candidates: lexical.rows.len(),
            vector,
            vector_candidates: vector_rows.len(),
            capability: self.capability.get(),
        };

        let mut cache: HashMap<String, CandidateRecord> =
            HashMap::with_capacity(lexical.rows.len() + vector_rows.len());
        for row in lexical.rows {
            cache.insert(row.id.clone(), row);
        }
        for row in vector_rows {
            cache.entry(row.id.clone()).or_insert(row);
        }

        let results = shape(&fused, &cache, query.content, self.config.display_chars);
        debug!(results = results.len(), ?report, "search complete");

        Ok(SearchOutcome { results, report })
    }

    /// Identity/context text from the backend, passed through untouched.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be reached.
    pub fn startup(&self) -> Result<String> {
        self.backend
            .startup()
            .with_context(|| format!("load startup text from {} store", self.backend.name()))
    }

    /// The embedder to use for this query, or why the vector leg is skipped.
    /// Probes capability the first time it gets that far.
    fn vector_plan(&self, query: &SearchQuery) -> Result<&dyn Embedder, SkipReason> {
        if !self.config.semantic || query.lexical_only {
            return Err(SkipReason::Disabled);
        }
        let Some(embedder) = self.embedder.as_deref() else {
            return Err(SkipReason::NoEmbedder);
        };
        if !self.vector_capability().is_available() {
            return Err(SkipReason::CapabilityUnavailable);
        }
        Ok(embedder)
    }
}
