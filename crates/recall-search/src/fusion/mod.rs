//! Rank fusion and the hybrid search coordinator built on it.

pub mod hybrid;
pub mod rrf;
