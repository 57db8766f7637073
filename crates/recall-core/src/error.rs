use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ConfigMissingField,
    UnsupportedBackend,
    StoreUnreachable,
    FtsIndexMissing,
    MalformedQuery,
    EmptyQuery,
    VectorUnavailable,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ConfigMissingField => "E1003",
            Self::UnsupportedBackend => "E1004",
            Self::StoreUnreachable => "E2001",
            Self::FtsIndexMissing => "E3001",
            Self::MalformedQuery => "E3002",
            Self::EmptyQuery => "E3003",
            Self::VectorUnavailable => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigMissingField => "Required config value missing",
            Self::UnsupportedBackend => "Unsupported storage backend",
            Self::StoreUnreachable => "Memory store unreachable",
            Self::FtsIndexMissing => "FTS index missing",
            Self::MalformedQuery => "Malformed full-text query",
            Self::EmptyQuery => "Search query is empty",
            Self::VectorUnavailable => "Vector search unavailable",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in recall/config.toml and retry."),
            Self::ConfigMissingField => {
                Some("Set store.url (or store.sqlite.db_path) in config, or pass --db.")
            }
            Self::UnsupportedBackend => Some("Use a sqlite:// store URL."),
            Self::StoreUnreachable => Some("Check the store path and file permissions."),
            Self::FtsIndexMissing => Some("Run `recall init` to create the FTS index."),
            Self::MalformedQuery => {
                Some("Quote terms or drop FTS operators; substring matching was used instead.")
            }
            Self::EmptyQuery => Some("Provide a non-empty query string."),
            Self::VectorUnavailable => {
                Some("Enable sqlite-vec and populate memories.embedding for semantic ranking.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures raised by the SQLite store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file could not be opened.
    #[error("failed to open store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A required table or index (FTS5 virtual table) does not exist.
    #[error("index missing: {0}")]
    MissingIndex(String),

    /// FTS5 rejected the query expression.
    #[error("malformed full-text query: {0}")]
    MalformedQuery(String),

    /// Any other SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Open { .. } => ErrorCode::StoreUnreachable,
            Self::MissingIndex(_) => ErrorCode::FtsIndexMissing,
            Self::MalformedQuery(_) => ErrorCode::MalformedQuery,
            Self::Sqlite(_) => ErrorCode::InternalUnexpected,
        }
    }
}
