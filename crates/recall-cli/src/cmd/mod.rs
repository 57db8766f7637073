pub mod init;
pub mod search;
pub mod startup;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::Context;
use recall_core::ErrorCode;
use recall_core::config::{Config, StoreLocation, load_config, resolve_store_from_env};
use recall_search::backend::SqliteBackend;
use recall_search::semantic::HttpEmbedder;
use recall_search::{Embedder, SearchCoordinator};

/// Invalid input caught before any store access.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("search query must not be empty")]
    EmptyQuery,
}

impl UsageError {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyQuery => ErrorCode::EmptyQuery,
        }
    }
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub db: Option<String>,
    pub config: Option<PathBuf>,
}

/// Loaded config plus the resolved store path.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub store: PathBuf,
}

impl Session {
    /// Load config and resolve where the store lives.
    pub fn open(globals: &Globals) -> anyhow::Result<Self> {
        let config = load_config(globals.config.as_deref()).context("load config")?;
        let StoreLocation::Sqlite(store) = resolve_store_from_env(globals.db.as_deref(), &config.store)
            .context("resolve memory store location")?;
        Ok(Self { config, store })
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Embedding client from the `[embedding]` section, if one is configured.
    pub fn embedder(&self) -> Option<Box<dyn Embedder>> {
        HttpEmbedder::from_config(&self.config.embedding).map(|e| Box::new(e) as Box<dyn Embedder>)
    }

    pub fn coordinator(&self) -> SearchCoordinator<SqliteBackend> {
        SearchCoordinator::new(SqliteBackend::new(&self.store), self.config.search.clone())
            .with_embedder(self.embedder())
    }
}
