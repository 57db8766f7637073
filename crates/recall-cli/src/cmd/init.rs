//! `recall init`: create or upgrade a store at the resolved location.
//!
//! Safe to re-run. Existing rows are kept; the FTS index is rebuilt so rows
//! written by other tools without the sync triggers become searchable.

use std::io::Write;

use anyhow::Context;
use clap::Args;
use recall_core::db::{fts, migrations, open_store};
use serde::Serialize;
use tracing::info;

use super::Session;
use crate::output::{OutputMode, kv, render};

#[derive(Args, Debug, Default)]
#[command(
    about = "Create or upgrade a memory store",
    after_help = "EXAMPLES:\n    recall --db sqlite:///home/me/.recall/recall.db init\n\n    recall init --json"
)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitOutput {
    store: String,
    created: bool,
    schema_version: u32,
}

/// Execute `recall init`.
///
/// # Errors
///
/// Returns an error if the store cannot be created, migrated, or reindexed.
pub fn run_init(_args: &InitArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    let path = session.store();
    let created = !path.exists();

    let conn = open_store(path)?;
    fts::rebuild_fts_index(&conn).context("rebuild full-text index")?;
    let schema_version =
        migrations::current_schema_version(&conn).context("read schema version")?;
    info!(store = %path.display(), created, schema_version, "store ready");

    let report = InitOutput {
        store: path.display().to_string(),
        created,
        schema_version,
    };
    render(output, &report, |r, w| {
        writeln!(
            w,
            "{} store at {}",
            if r.created { "Created" } else { "Upgraded" },
            r.store
        )?;
        kv(w, "schema version", r.schema_version.to_string())
    })
}
