//! Text and JSON renderings of the work log.

use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::Result;
use crate::record::TaskRecord;
use crate::store::{format_date, month_bounds, WorkLog};
use crate::task::Task;

pub const NO_TASKS: &str = "No tasks found";
pub const NO_ERRORS: &str = "No errors found";

/// Daily report rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per task, prefixed with its identifier
    #[default]
    Terminal,
    /// Like terminal, without identifiers (for sharing)
    Email,
    /// Array of task records with elapsed minutes
    Json,
}

pub fn format_minutes(minutes: f64) -> String {
    format!("{minutes:.1}")
}

/// Rounds to tenths of a minute before splitting so the minutes never read 60.0.
pub fn format_total(minutes: f64) -> String {
    let tenths = (minutes.max(0.0) * 10.0).round() as u64;
    format!(
        "Total time: {} Hrs {} minutes",
        tenths / 600,
        format_minutes((tenths % 600) as f64 / 10.0)
    )
}

pub fn total_minutes<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    clock: &dyn Clock,
) -> Result<f64> {
    tasks
        .into_iter()
        .map(|task| task.elapsed_minutes(clock))
        .sum()
}

/// `- description: minutes STATUS` followed by indented notes.
/// Status is left out once the task is completed.
pub fn task_line(task: &Task, clock: &dyn Clock, with_id: bool) -> Result<String> {
    let mut line = String::new();
    if with_id {
        line.push_str(&format!("{} ", task.id()));
    }
    line.push_str(&format!(
        "- {}: {}",
        task.description(),
        format_minutes(task.elapsed_minutes(clock)?)
    ));
    if !task.status().is_completed() {
        line.push_str(&format!(" {}", task.status()));
    }
    push_notes(&mut line, task);
    Ok(line)
}

/// Line for a task left open on a past day. No minutes: an interval still
/// open from an earlier day cannot be measured.
pub fn stale_line(task: &Task) -> String {
    let mut line = format!("{} - {}: {}", task.id(), task.description(), task.status());
    push_notes(&mut line, task);
    line
}

fn push_notes(line: &mut String, task: &Task) {
    for note in task.notes() {
        line.push_str(&format!("\n  - {note}"));
    }
}

pub fn daily(tasks: &[Task], format: ReportFormat, clock: &dyn Clock) -> Result<String> {
    if format == ReportFormat::Json {
        let records = tasks
            .iter()
            .map(|task| TaskRecord::with_minutes(task, clock))
            .collect::<Result<Vec<_>>>()?;
        return Ok(serde_json::to_string_pretty(&records)?);
    }

    if tasks.is_empty() {
        return Ok(NO_TASKS.to_string());
    }

    let with_id = format == ReportFormat::Terminal;
    let mut lines = tasks
        .iter()
        .map(|task| task_line(task, clock, with_id))
        .collect::<Result<Vec<_>>>()?;
    lines.push(format_total(total_minutes(tasks, clock)?));
    Ok(lines.join("\n"))
}

pub fn monthly(log: &WorkLog, reference: NaiveDate, clock: &dyn Clock) -> Result<String> {
    let mut lines = Vec::new();
    let mut total = 0.0;
    for (date, tasks) in log.month(reference) {
        lines.push(format_date(date));
        for task in tasks {
            lines.push(task_line(task, clock, false)?);
        }
        total += total_minutes(tasks, clock)?;
    }
    lines.push(format_total(total));
    Ok(lines.join("\n"))
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub month: String,
    pub days: Vec<DaySummary>,
    pub total_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub tasks: Vec<TaskRecord>,
}

pub fn monthly_summary(
    log: &WorkLog,
    reference: NaiveDate,
    clock: &dyn Clock,
) -> Result<MonthlySummary> {
    let (first, _) = month_bounds(reference);
    let mut days = Vec::new();
    let mut total = 0.0;
    for (date, tasks) in log.month(reference) {
        let records = tasks
            .iter()
            .map(|task| TaskRecord::with_minutes(task, clock))
            .collect::<Result<Vec<_>>>()?;
        total += records.iter().filter_map(|record| record.minutes).sum::<f64>();
        days.push(DaySummary {
            date: format_date(date),
            tasks: records,
        });
    }
    Ok(MonthlySummary {
        month: first.format("%Y-%m").to_string(),
        days,
        total_minutes: total,
    })
}

/// Stale-task listing produced by [`WorkLog::scan_errors`].
pub fn errors(scan: &[(NaiveDate, Vec<&Task>)], highlight: bool) -> String {
    if scan.is_empty() {
        return NO_ERRORS.to_string();
    }
    let mut lines = Vec::new();
    for (date, tasks) in scan {
        let header = format_date(*date);
        if highlight {
            lines.push(header.yellow().bold().to_string());
        } else {
            lines.push(header);
        }
        lines.extend(tasks.iter().map(|task| stale_line(task)));
    }
    lines.join("\n")
}
