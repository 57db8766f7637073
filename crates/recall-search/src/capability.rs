//! Per-session memo of whether the vector leg can run.
//!
//! The state moves exactly once from [`VectorCapability::Unprobed`] to a
//! probed value and never reverts. Concurrent first callers block on a single
//! probe run and all observe its result.

use std::sync::OnceLock;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorCapability {
    Unprobed,
    Available,
    Unavailable,
}

impl VectorCapability {
    #[must_use]
    pub const fn from_probe(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Unset means unprobed.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    state: OnceLock<VectorCapability>,
}

impl CapabilityCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Current state without probing.
    #[must_use]
    pub fn get(&self) -> VectorCapability {
        self.state
            .get()
            .copied()
            .unwrap_or(VectorCapability::Unprobed)
    }

    /// Return the cached state, running `probe` first if nothing is cached.
    pub fn get_or_probe(&self, probe: impl FnOnce() -> bool) -> VectorCapability {
        *self
            .state
            .get_or_init(|| VectorCapability::from_probe(probe()))
    }
}

/// Snapshot of what a backend session can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackendCapabilities {
    /// Always `true`: every backend answers lexical queries.
    pub has_lexical: bool,
    pub has_vector: bool,
    pub probed: VectorCapability,
}

impl BackendCapabilities {
    #[must_use]
    pub const fn from_state(probed: VectorCapability) -> Self {
        Self {
            has_lexical: true,
            has_vector: probed.is_available(),
            probed,
        }
    }
}
