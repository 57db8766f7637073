//! `recall startup`: print the identity/context text stored with the memories.

use std::io::Write;

use clap::Args;
use serde::Serialize;

use super::Session;
use crate::output::{OutputMode, render};

#[derive(Args, Debug, Default)]
#[command(
    about = "Print startup context",
    long_about = "Print the startup rows of the store, ordered by priority, as one block of text.",
    after_help = "EXAMPLES:\n    # Feed identity context into a session\n    recall startup\n\n    recall startup --json"
)]
pub struct StartupArgs {}

#[derive(Debug, Serialize)]
struct StartupOutput {
    startup: String,
}

/// Execute `recall startup`.
///
/// # Errors
///
/// Returns an error if the store cannot be reached.
pub fn run_startup(_args: &StartupArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    let startup = session.coordinator().startup()?;
    render(output, &StartupOutput { startup }, |out, w| {
        if out.startup.is_empty() {
            Ok(())
        } else {
            writeln!(w, "{}", out.startup)
        }
    })
}
