#![forbid(unsafe_code)]
//! recall-core library.
//!
//! Storage plumbing shared by the search engine and the CLI: configuration,
//! error codes, the SQLite store schema, and the per-leg SQL queries.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at the storage seam, `anyhow::Result`
//!   where a caller only needs context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod capabilities;
pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use error::{ErrorCode, StoreError};
pub use model::{MemoryFilter, MemoryRow};
