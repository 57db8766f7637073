//! `recall status`: which retrieval paths this store and config can use.
//!
//! Reports reachability, schema version, and every optional capability with
//! the fallback search uses when it is missing. Never fails on a missing or
//! broken store; that is what it is for.

use std::io::Write;

use clap::Args;
use recall_core::capabilities::{
    Capabilities, CapabilityStatus, describe_capabilities, detect_capabilities,
};
use recall_core::config::EmbeddingProvider;
use recall_core::db::{migrations, open_store_read_only, ping};
use serde::Serialize;
use tracing::debug;

use super::Session;
use crate::output::{OutputMode, kv, render, rule};

#[derive(Args, Debug, Default)]
#[command(
    about = "Show store and capability status",
    after_help = "EXAMPLES:\n    recall status\n\n    recall --db sqlite:///tmp/recall.db status --json"
)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
struct EmbeddingStatus {
    provider: EmbeddingProvider,
    url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    store: String,
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedded_rows: Option<i64>,
    embedding: EmbeddingStatus,
    capabilities: Vec<CapabilityStatus>,
}

/// Execute `recall status`.
///
/// # Errors
///
/// Returns an error only if output rendering fails.
pub fn run_status(_args: &StatusArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    let embedder_configured = session.config.embedding.provider != EmbeddingProvider::None;
    let reachable = ping(session.store());

    let (schema_version, embedded_rows, capabilities) = if reachable {
        match open_store_read_only(session.store()) {
            Ok(conn) => {
                let caps = detect_capabilities(&conn);
                let version = migrations::current_schema_version(&conn)
                    .inspect_err(|e| debug!(error = %e, "schema version unreadable"))
                    .ok();
                (
                    version,
                    Some(caps.embedded_rows),
                    describe_capabilities(&caps, embedder_configured),
                )
            }
            Err(e) => {
                debug!(error = %e, "store answered ping but not a second open");
                (None, None, describe_capabilities(&Capabilities::default(), embedder_configured))
            }
        }
    } else {
        (None, None, describe_capabilities(&Capabilities::default(), embedder_configured))
    };

    let report = StatusOutput {
        store: session.store().display().to_string(),
        reachable,
        schema_version,
        embedded_rows,
        embedding: EmbeddingStatus {
            provider: session.config.embedding.provider,
            url: session.config.embedding.url.clone(),
            model: session.config.embedding.model.clone(),
        },
        capabilities,
    };

    render(output, &report, render_status_human)
}

fn render_status_human(report: &StatusOutput, w: &mut dyn Write) -> std::io::Result<()> {
    kv(w, "store", &report.store)?;
    kv(w, "reachable", if report.reachable { "yes" } else { "no" })?;
    if let Some(version) = report.schema_version {
        kv(w, "schema version", version.to_string())?;
    }
    if let Some(rows) = report.embedded_rows {
        kv(w, "embedded rows", rows.to_string())?;
    }
    let provider = match report.embedding.provider {
        EmbeddingProvider::Ollama => "ollama",
        EmbeddingProvider::OpenAi => "openai",
        EmbeddingProvider::None => "none",
    };
    kv(w, "embedding", format!("{provider} {} ({})", report.embedding.model, report.embedding.url))?;

    rule(w)?;
    for cap in &report.capabilities {
        if cap.available {
            writeln!(w, "  ok       {}", cap.name)?;
        } else {
            writeln!(w, "  missing  {}: {}", cap.name, cap.fallback)?;
        }
    }
    Ok(())
}
