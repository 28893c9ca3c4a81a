//! worklog - daily work log library
//!
//! Core of the `worklog` CLI: tasks recorded per calendar day, each with
//! a lifecycle and the time intervals worked on it.
//!
//! # Core Concepts
//!
//! - **Task**: a description, a status, its worked intervals and notes
//! - **Interval**: a start and an optional end; only a task's last interval may be open
//! - **Work log**: one TOML file mapping `YYYY-MM-DD` keys to lists of tasks
//! - **Reports**: daily and monthly text or JSON, plus a typeset monthly PDF
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `clock`: Injectable time source
//! - `config`: Configuration loading from `config.toml`
//! - `document`: Monthly LaTeX rendering and PDF compilation
//! - `error`: Error types, exit codes and result aliases
//! - `output`: Human and JSON output envelopes
//! - `record`: On-disk task record format
//! - `report`: Daily, monthly and error reports
//! - `storage`: Atomic writes and log file resolution
//! - `store`: The work log document
//! - `task`: Task state machine and interval accounting
//!
//! # Concurrency
//!
//! The work log file is not locked. Every command loads it, mutates it in
//! memory and writes it back whole, so two concurrent invocations on the
//! same file race and the last writer wins.

pub mod cli;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod record;
pub mod report;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
