#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "recall: hybrid lexical + semantic memory search",
    long_about = None
)]
struct Cli {
    /// Store URL, e.g. `sqlite:///home/me/.recall/recall.db`. Overrides
    /// `RECALL_DB` and the config file.
    #[arg(long, global = true, value_name = "URL")]
    db: Option<String>,

    /// Config file (default: `<config_dir>/recall/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging when `RECALL_LOG` is unset.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    const fn output_mode(&self) -> OutputMode {
        OutputMode::from_flag(self.json)
    }

    fn globals(&self) -> cmd::Globals {
        cmd::Globals {
            db: self.db.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    Search(cmd::search::SearchArgs),
    Startup(cmd::startup::StartupArgs),
    Status(cmd::status::StatusArgs),
    Init(cmd::init::InitArgs),
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose || env::var("DEBUG").is_ok() {
        "recall=debug,info"
    } else {
        "recall=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("RECALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let format = env::var("RECALL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let output = cli.output_mode();
    if let Commands::Search(args) = &cli.command {
        args.check()?;
    }
    let session = cmd::Session::open(&cli.globals())?;
    debug!(store = %session.store().display(), "store resolved");

    match &cli.command {
        Commands::Search(args) => cmd::search::run_search(args, &session, output),
        Commands::Startup(args) => cmd::startup::run_startup(args, &session, output),
        Commands::Status(args) => cmd::status::run_status(args, &session, output),
        Commands::Init(args) => cmd::init::run_init(args, &session, output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(io_err) = render_error(cli.output_mode(), &CliError::from_anyhow(&err)) {
                eprintln!("error: {err:#} (while reporting: {io_err})");
            }
            ExitCode::FAILURE
        }
    }
}
