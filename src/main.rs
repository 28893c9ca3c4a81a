//! worklog - daily work log CLI
//!
//! Tracks the tasks worked on each day in a plain TOML file and reports
//! the time spent on them per day or per month.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use worklog::cli::Cli;
use worklog::output::{emit_error, infer_command_name_from_args};

fn main() {
    // Tracing is opt-in via RUST_LOG and goes to stderr.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
