//! What worklog commands print.
//!
//! Mutating commands print a [`Receipt`]: a header line, aligned fields and
//! any soft warnings. With `--json` the same data goes out in one envelope:
//!
//! ```json
//! { "schema_version": "worklog.v1", "command": "pause", "ok": true,
//!   "data": { ... }, "warnings": ["Task is not running"] }
//! ```
//!
//! Failures use the same envelope with `ok: false` and an `error` object.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "worklog.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Human-readable result of one command.
#[derive(Debug, Clone)]
pub struct Receipt {
    header: String,
    fields: Vec<(&'static str, String)>,
    warnings: Vec<String>,
}

impl Receipt {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            fields: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn field(&mut self, key: &'static str, value: impl Into<String>) {
        self.fields.push((key, value.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Header, then `key: value` lines padded to the longest key, then
    /// one `warning:` line per warning.
    pub fn render(&self) -> String {
        let width = self.fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        let mut lines = vec![self.header.clone()];
        lines.extend(
            self.fields
                .iter()
                .map(|(key, value)| format!("  {key:<width$}  {value}")),
        );
        lines.extend(self.warnings.iter().map(|warning| format!("warning: {warning}")));
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

/// JSON envelope for `data`, or the receipt (if any) unless quiet.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    receipt: Option<&Receipt>,
) -> Result<()> {
    if options.json {
        println!("{}", success_json(command, data, receipt)?);
        return Ok(());
    }
    if let (false, Some(receipt)) = (options.quiet, receipt) {
        println!("{}", receipt.render());
    }
    Ok(())
}

pub fn success_json<T: Serialize>(
    command: &str,
    data: &T,
    receipt: Option<&Receipt>,
) -> Result<String> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        ok: true,
        data: Some(data),
        error: None,
        warnings: receipt
            .map(|receipt| receipt.warnings().to_vec())
            .unwrap_or_default(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Print a plain-text report unless quiet.
pub fn emit_text(options: OutputOptions, text: &str) {
    if !options.quiet {
        println!("{text}");
    }
}

/// Errors go to stdout as an envelope with `--json`, else to stderr.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        println!("{}", error_json(command, err)?);
        return Ok(());
    }
    eprintln!("error: {err}");
    if let Some(hint) = hint(err) {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn error_json(command: &str, err: &Error) -> Result<String> {
    let envelope: Envelope<'_, ()> = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        ok: false,
        data: None,
        error: Some(ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: error_kind(err),
            details: err.details(),
            hint: hint(err),
        }),
        warnings: Vec::new(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// First positional argument, skipping the values of global options.
pub fn infer_command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--file" | "--config" | "--date") {
            args.next();
        } else if !arg.starts_with('-') {
            return arg;
        }
    }
    "worklog".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "integrity_error",
        _ => "operation_failed",
    }
}

fn hint(err: &Error) -> Option<String> {
    let hint = match err {
        Error::NotFound { date, .. } => format!("list the day's tasks: worklog --date {date} report"),
        Error::Ambiguous { .. } => "pass a longer part of the task id".to_string(),
        Error::MissingLogFile => "pass --file <path> or export WORK_LOG=<path>".to_string(),
        Error::InvalidConfig(_) => "fix the worklog config.toml then retry".to_string(),
        Error::TemporalInvariant(_) | Error::InvalidState(_) | Error::InvalidLog { .. } => {
            "repair the task in the work log by hand, then retry".to_string()
        }
        Error::DocumentBuild(_) => "check that document.engine is installed and on PATH".to_string(),
        _ => return None,
    };
    Some(hint)
}
