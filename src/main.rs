//! # tb - personal task board
//!
//! A command-line task board with three fixed categories (life admin, work
//! and weekly recurring), stable manual ordering inside each category,
//! weekly recurring tasks with per-day completions, file attachments,
//! comments and an activity trail.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task to the bottom of the work list
//! tb add "Draft quarterly report" --category work --due friday
//!
//! # Drop it at the top of the list
//! tb move "Draft quarterly report" --at 0
//!
//! # A habit that repeats for four weeks, ticked off for today
//! tb add "Stretch" --category weekly-recurring --weeks 4
//! tb done-day Stretch
//! tb week
//!
//! # Everything still open, in board order
//! tb list
//! ```
//!
//! ## Ordering
//!
//! Every task carries a sparse integer order value. Moving a task gives it
//! the midpoint of its new neighbours, so a move rewrites one task. When
//! two neighbours have no integer left between them the destination
//! category is renumbered `0, 1, 2, ...` in one go.
//!
//! Data is stored in `~/.taskboard/tasks.json`; settings are read from
//! `~/.taskboard/config.toml`. Set `RUST_LOG=taskboard=debug` to trace
//! what the store is doing.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod ordering;
pub mod store;
pub mod sync;
pub mod task;

use cli::Cli;
use config::{default_data_dir, Config, CONFIG_FILE};
use error::{JsonError, Result};
use sync::{JsonFileRemote, Session};

fn init_tracing() {
    // Opt-in via RUST_LOG; stay quiet otherwise so output stays scriptable.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let cmd::Commands::Completions { shell } = cli.command {
        cmd::cmd_completions(shell);
        return Ok(());
    }

    let data_dir = default_data_dir();
    let config_path = cli.config.clone().unwrap_or_else(|| data_dir.join(CONFIG_FILE));
    let config = Config::load(&config_path)?;
    let db_path = config.data_path(&data_dir, cli.db.as_deref());
    tracing::debug!(config = %config_path.display(), db = %db_path.display(), "resolved paths");

    let mut session = Session::open(JsonFileRemote::new(db_path), &config)?;
    cmd::run(&mut session, cli.command, cli.json)
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = run(cli) {
        tracing::debug!(error = %err, "command failed");
        if json {
            let body = serde_json::to_string(&JsonError::from(&err))
                .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", err.friendly()));
            eprintln!("{body}");
        } else {
            eprintln!("Error: {}", err.friendly());
        }
        std::process::exit(err.exit_code());
    }
}
