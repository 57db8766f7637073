//! Search request parameters.

use recall_core::MemoryFilter;
use serde::{Deserialize, Serialize};

/// Default number of results.
pub const DEFAULT_LIMIT: usize = 5;

/// Which content field a result carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    /// Condensed form, falling back to full content when none exists.
    #[default]
    Summary,
    /// Raw stored content.
    Full,
}

/// One search request. Immutable once handed to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub limit: usize,
    pub filter: MemoryFilter,
    pub content: ContentMode,
    /// Skip the vector leg even when it is available.
    pub lexical_only: bool,
}

impl SearchQuery {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_LIMIT,
            filter: MemoryFilter::default(),
            content: ContentMode::Summary,
            lexical_only: false,
        }
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.filter.category = category;
        self
    }

    #[must_use]
    pub const fn with_content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub const fn lexical_only(mut self, lexical_only: bool) -> Self {
        self.lexical_only = lexical_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let q = SearchQuery::new("watson");
        assert_eq!(q.limit, 5);
        assert_eq!(q.content, ContentMode::Summary);
        assert_eq!(q.filter, MemoryFilter::default());
        assert!(!q.lexical_only);
    }

    #[test]
    fn builder_sets_fields() {
        let q = SearchQuery::new("watson")
            .with_limit(12)
            .with_category(Some("contacts".into()))
            .with_content(ContentMode::Full)
            .lexical_only(true);
        assert_eq!(q.limit, 12);
        assert_eq!(q.filter.category.as_deref(), Some("contacts"));
        assert_eq!(q.content, ContentMode::Full);
        assert!(q.lexical_only);
    }
}
