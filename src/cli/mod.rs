//! Command-line interface for worklog
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::report::ReportFormat;
use crate::storage;
use crate::store::parse_date;
use crate::task::{Action, ActionKind};

mod document;
mod report;
mod task;

/// worklog - daily work log
///
/// Records the tasks worked on each day, tracks their time through
/// start/pause/complete, and reports per day or per month.
#[derive(Parser, Debug)]
#[command(name = "worklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Work log file (TOML)
    #[arg(long, global = true, env = "WORK_LOG")]
    pub file: Option<PathBuf>,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, env = "WORKLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Day to work on, e.g. 2024-07-03 (defaults to today, UTC)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task for the day
    Add {
        /// What the task is about
        description: String,
    },

    /// Report what was done on the day
    Report {
        /// Output format (defaults to report.format from the config)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },

    /// Report every day of the month containing --date
    Monthly,

    /// Typeset the month containing --date into a PDF
    Pdf,

    /// Start or resume a task
    Start {
        /// Task id or any unique part of it
        task: String,
    },

    /// Pause a running task
    Pause {
        /// Task id or any unique part of it
        task: String,
    },

    /// Complete a running task
    Complete {
        /// Task id or any unique part of it
        task: String,
    },

    /// Append a note to a task
    Note {
        /// Task id or any unique part of it
        task: String,

        /// Note text
        text: String,
    },

    /// Apply a named action to a task
    Action {
        /// Task id or any unique part of it
        task: String,

        /// One of: start, pause, complete, note
        action: ActionKind,

        /// Note text (for the note action)
        #[arg(long)]
        note: Option<String>,
    },

    /// List incomplete tasks left on days other than --date
    Errors,
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        self.run_with_clock(&SystemClock)
    }

    pub fn run_with_clock(self, clock: &dyn Clock) -> Result<()> {
        let config = Config::load_or_default(self.config.as_deref());
        let log = storage::resolve_log_path(self.file, &config)?;
        let date = self.date.unwrap_or_else(|| clock.today());
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Add { description } => task::run_add(task::AddOptions {
                description,
                log,
                date,
                output,
            }),
            Commands::Report { format } => report::run_daily(
                report::DailyOptions {
                    log,
                    date,
                    format: format.unwrap_or(config.report.format),
                    output,
                },
                clock,
            ),
            Commands::Monthly => report::run_monthly(
                report::MonthlyOptions { log, date, output },
                clock,
            ),
            Commands::Pdf => document::run(
                document::PdfOptions {
                    log,
                    date,
                    config: config.document,
                    output,
                },
                clock,
            ),
            Commands::Start { task } => run_action(task, Action::Start, log, date, output, clock),
            Commands::Pause { task } => run_action(task, Action::Pause, log, date, output, clock),
            Commands::Complete { task } => {
                run_action(task, Action::Complete, log, date, output, clock)
            }
            Commands::Note { task, text } => {
                run_action(task, Action::note(text)?, log, date, output, clock)
            }
            Commands::Action { task, action, note } => {
                run_action(task, Action::new(action, note)?, log, date, output, clock)
            }
            Commands::Errors => report::run_errors(report::ErrorsOptions {
                log,
                today: date,
                output,
            }),
        }
    }
}

fn run_action(
    task: String,
    action: Action,
    log: PathBuf,
    date: NaiveDate,
    output: OutputOptions,
    clock: &dyn Clock,
) -> Result<()> {
    task::run_action(
        task::ActionOptions {
            task,
            action,
            log,
            date,
            output,
        },
        clock,
    )
}
