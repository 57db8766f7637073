//! Configuration loading and store-location resolution.
//!
//! Config lives in `<config_dir>/recall/config.toml`. Every field has a
//! default, so a missing file yields a usable (if store-less) configuration.
//! The store location is resolved separately because it may also come from
//! the `--db` flag or the `RECALL_DB` / `RECALL_BACKEND` environment.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable holding a store URL.
pub const STORE_URL_ENV: &str = "RECALL_DB";
/// Environment variable overriding `store.backend`.
pub const BACKEND_ENV: &str = "RECALL_BACKEND";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required config value: {0}")]
    MissingField(&'static str),

    #[error("unknown store URL scheme '{0}' (supported: sqlite)")]
    UnsupportedScheme(String),

    #[error("storage backend '{0}' is not supported by this build (supported: sqlite)")]
    UnsupportedBackend(String),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::MissingField(_) => ErrorCode::ConfigMissingField,
            Self::UnsupportedScheme(_) | Self::UnsupportedBackend(_) => {
                ErrorCode::UnsupportedBackend
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store URL, e.g. `sqlite:///home/me/.recall/recall.db`.
    #[serde(default)]
    pub url: Option<String>,
    /// Backend name used when `url` is absent.
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Which wire format the embedding service speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// `POST {model, prompt}` → `{embedding: [...]}`.
    #[default]
    Ollama,
    /// `POST {model, input, dimensions}` → `{data: [{embedding: [...]}]}`.
    #[serde(alias = "openai-compatible")]
    OpenAi,
    /// No embedding service; the vector leg never runs.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_embedding_url")]
    pub url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Requested output size; only sent to OpenAI-style services.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Upper bound on a single embedding request. Generous enough to cover a
    /// cold model load on the first call.
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            url: default_embedding_url(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            timeout_ms: default_embedding_timeout_ms(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Retrieval and fusion tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// RRF smoothing constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// Candidates fetched per leg before fusion.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    /// Maximum characters of content returned per result.
    #[serde(default = "default_display_chars")]
    pub display_chars: usize,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Attempt the vector leg at all.
    #[serde(default = "default_true")]
    pub semantic: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            candidate_pool: default_candidate_pool(),
            display_chars: default_display_chars(),
            default_limit: default_limit(),
            semantic: default_true(),
        }
    }
}

fn default_embedding_url() -> String {
    "http://localhost:11434/api/embeddings".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

const fn default_embedding_dimensions() -> usize {
    768
}

const fn default_embedding_timeout_ms() -> u64 {
    8_000
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

const fn default_rrf_k() -> usize {
    60
}

const fn default_candidate_pool() -> usize {
    50
}

const fn default_display_chars() -> usize {
    800
}

const fn default_limit() -> usize {
    5
}

const fn default_true() -> bool {
    true
}

/// `<config_dir>/recall/config.toml`, if the OS exposes a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("recall").join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// and a missing file yields [`Config::default`].
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] when the file
/// cannot be read or is not valid TOML for [`Config`].
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse { path, source })
}

/// Where the memory store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Sqlite(PathBuf),
}

/// Parse a store URL.
///
/// `sqlite:///abs/path.db` and `sqlite://relative.db` both map to a path.
/// PostgreSQL and MySQL schemes are recognized and rejected as unsupported.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedScheme`] for unknown schemes,
/// [`ConfigError::UnsupportedBackend`] for recognized but unavailable ones,
/// and [`ConfigError::MissingField`] for an empty SQLite path.
pub fn parse_store_url(url: &str) -> Result<StoreLocation, ConfigError> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ConfigError::UnsupportedScheme(String::new()));
    };

    match backend_kind(scheme)? {
        BackendKind::Sqlite => {
            if rest.is_empty() {
                return Err(ConfigError::MissingField("sqlite path in store URL"));
            }
            Ok(StoreLocation::Sqlite(expand_tilde(Path::new(rest))))
        }
    }
}

/// Resolve the store location from the CLI flag, environment, and config.
///
/// Precedence: `cli_url` > `env_url` > `store.url` > backend + backend fields.
///
/// # Errors
///
/// Returns a [`ConfigError`] when nothing names a store or the named backend
/// is unsupported.
pub fn resolve_store(
    cli_url: Option<&str>,
    env_url: Option<&str>,
    env_backend: Option<&str>,
    store: &StoreConfig,
) -> Result<StoreLocation, ConfigError> {
    if let Some(url) = cli_url.or(env_url).or(store.url.as_deref()) {
        return parse_store_url(url);
    }

    let backend = env_backend
        .or(store.backend.as_deref())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or(ConfigError::MissingField("store.url or store.backend"))?;

    match backend_kind(backend)? {
        BackendKind::Sqlite => store
            .sqlite
            .db_path
            .as_deref()
            .map(|p| StoreLocation::Sqlite(expand_tilde(p)))
            .ok_or(ConfigError::MissingField("store.sqlite.db_path")),
    }
}

/// [`resolve_store`] reading `RECALL_DB` and `RECALL_BACKEND` from the process
/// environment.
///
/// # Errors
///
/// See [`resolve_store`].
pub fn resolve_store_from_env(
    cli_url: Option<&str>,
    store: &StoreConfig,
) -> Result<StoreLocation, ConfigError> {
    let env_url = env::var(STORE_URL_ENV).ok();
    let env_backend = env::var(BACKEND_ENV).ok();
    resolve_store(cli_url, env_url.as_deref(), env_backend.as_deref(), store)
}

enum BackendKind {
    Sqlite,
}

fn backend_kind(name: &str) -> Result<BackendKind, ConfigError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sqlite" => Ok(BackendKind::Sqlite),
        "postgresql" | "postgres" | "pg" | "mysql" | "mariadb" => {
            Err(ConfigError::UnsupportedBackend(name.to_string()))
        }
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.search.rrf_k, 60);
        assert_eq!(cfg.search.candidate_pool, 50);
        assert_eq!(cfg.search.display_chars, 800);
        assert_eq!(cfg.search.default_limit, 5);
        assert!(cfg.search.semantic);
        assert_eq!(cfg.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(cfg.embedding.timeout_ms, 8_000);
        assert_eq!(cfg.embedding.dimensions, 768);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [store]
            url = "sqlite:///tmp/recall.db"

            [embedding]
            provider = "openai"
            url = "https://api.openai.com/v1/embeddings"

            [search]
            rrf_k = 30
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.store.url.as_deref(), Some("sqlite:///tmp/recall.db"));
        assert_eq!(cfg.embedding.provider, EmbeddingProvider::OpenAi);
        assert_eq!(cfg.embedding.model, "nomic-embed-text");
        assert_eq!(cfg.search.rrf_k, 30);
        assert_eq!(cfg.search.candidate_pool, 50);
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search\nrrf_k = ").expect("write");

        let err = load_config(Some(&path)).expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
    }

    #[test]
    fn load_config_requires_explicit_file_to_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_config(Some(&dir.path().join("absent.toml"))).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn parse_sqlite_urls() {
        assert_eq!(
            parse_store_url("sqlite:///var/lib/recall.db").expect("abs"),
            StoreLocation::Sqlite(PathBuf::from("/var/lib/recall.db"))
        );
        assert_eq!(
            parse_store_url("SQLITE://data/recall.db").expect("rel"),
            StoreLocation::Sqlite(PathBuf::from("data/recall.db"))
        );
    }

    #[test]
    fn parse_rejects_unsupported_schemes() {
        assert!(matches!(
            parse_store_url("postgresql://user@host/db"),
            Err(ConfigError::UnsupportedBackend(_))
        ));
        assert!(matches!(
            parse_store_url("mariadb://root@localhost/shadow"),
            Err(ConfigError::UnsupportedBackend(_))
        ));
        assert!(matches!(
            parse_store_url("redis://localhost"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_store_url("/no/scheme.db"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_store_url("sqlite://"),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn resolve_store_precedence() {
        let store = StoreConfig {
            url: Some("sqlite:///from/config.db".into()),
            ..StoreConfig::default()
        };

        let cli = resolve_store(
            Some("sqlite:///from/cli.db"),
            Some("sqlite:///from/env.db"),
            None,
            &store,
        )
        .expect("cli");
        assert_eq!(cli, StoreLocation::Sqlite("/from/cli.db".into()));

        let env = resolve_store(None, Some("sqlite:///from/env.db"), None, &store).expect("env");
        assert_eq!(env, StoreLocation::Sqlite("/from/env.db".into()));

        let cfg = resolve_store(None, None, None, &store).expect("config");
        assert_eq!(cfg, StoreLocation::Sqlite("/from/config.db".into()));
    }

    #[test]
    fn resolve_store_from_backend_fields() {
        let store = StoreConfig {
            url: None,
            backend: Some("sqlite".into()),
            sqlite: SqliteConfig {
                db_path: Some("/data/recall.db".into()),
            },
        };
        assert_eq!(
            resolve_store(None, None, None, &store).expect("backend"),
            StoreLocation::Sqlite("/data/recall.db".into())
        );

        let missing_path = StoreConfig {
            backend: Some("sqlite".into()),
            ..StoreConfig::default()
        };
        assert!(matches!(
            resolve_store(None, None, None, &missing_path),
            Err(ConfigError::MissingField("store.sqlite.db_path"))
        ));

        assert!(matches!(
            resolve_store(None, None, Some("mysql"), &store),
            Err(ConfigError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn resolve_store_without_any_source_is_configuration_error() {
        let err = resolve_store(None, None, None, &StoreConfig::default()).expect_err("none");
        assert_eq!(err.code(), ErrorCode::ConfigMissingField);
    }
}
