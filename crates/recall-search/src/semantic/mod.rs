//! Query embedding.
//!
//! The search engine only needs `text -> vector | absent`. Failures of any
//! kind (service down, timeout, bad payload) surface as `None` so the vector
//! leg is skipped instead of failing the search.

pub mod embed;

pub use embed::{EmbedError, HttpEmbedder};

/// Turns query text into a fixed-dimension vector.
pub trait Embedder: Send + Sync {
    /// Embed `text`, or `None` when no vector could be obtained.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
}
