//! Shared output layer: human text or stable JSON for every command.
//!
//! Results go to stdout, errors to stderr. In JSON mode an error is written
//! as `{"error": {"message", "error_code", "suggestion"}}` so agents can
//! branch on the code instead of parsing prose.

use std::io::{self, Write};

use recall_core::ErrorCode;
use recall_core::StoreError;
use recall_core::config::ConfigError;
use recall_search::BackendError;
use serde::Serialize;

use crate::cmd::UsageError;

/// Width of the separator used by human output.
pub const RULE_WIDTH: usize = 72;

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Left-aligned key/value line.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<18} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }

    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A structured error with an optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Build from an error chain, taking the code of the first typed cause.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = error_code_of(err);
        Self {
            message: format!("{err:#}"),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// The [`ErrorCode`] of the first cause in `err` that carries one.
pub fn error_code_of(err: &anyhow::Error) -> ErrorCode {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<UsageError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<BackendError>() {
            return e.code();
        }
        if let Some(e) = cause.downcast_ref::<StoreError>() {
            return e.code();
        }
    }
    ErrorCode::InternalUnexpected
}

/// Render a serializable value to stdout: JSON, or via `human_fn`.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper).map_err(io::Error::other)?;
            writeln!(out)
        }
        OutputMode::Human => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
            Ok(())
        }
    }
}
