#![forbid(unsafe_code)]
//! recall-search library.
//!
//! Hybrid retrieval: a lexical leg that always runs, an optional vector leg,
//! and Reciprocal Rank Fusion over both. Every failure except an unreachable
//! store degrades the result instead of failing the call.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at the public entry points, typed
//!   [`backend::BackendError`] at the storage seam.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod backend;
pub mod capability;
pub mod fusion;
pub mod legs;
pub mod query;
pub mod semantic;
pub mod shape;

pub use backend::{Backend, BackendError, CandidateRecord};
pub use capability::{BackendCapabilities, CapabilityCache, VectorCapability};
pub use fusion::hybrid::{SearchCoordinator, SearchOutcome, SearchReport, SkipReason, VectorOutcome};
pub use fusion::rrf::{DEFAULT_RRF_K, FusedHit, fuse};
pub use legs::LexicalMode;
pub use query::{ContentMode, SearchQuery};
pub use semantic::Embedder;
pub use shape::ResultRecord;
