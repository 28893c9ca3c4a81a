//! worklog task command implementations.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::Result;
use crate::output::{emit_success, OutputOptions, Receipt};
use crate::record::TaskRecord;
use crate::store::{format_date, WorkLog};
use crate::task::{Action, Transition};

pub struct AddOptions {
    pub description: String,
    pub log: PathBuf,
    pub date: NaiveDate,
    pub output: OutputOptions,
}

pub struct ActionOptions {
    pub task: String,
    pub action: Action,
    pub log: PathBuf,
    pub date: NaiveDate,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct AddOutput {
    id: String,
    date: String,
    description: String,
}

#[derive(Serialize)]
struct ActionOutput {
    action: &'static str,
    date: String,
    applied: bool,
    task: TaskRecord,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut log = WorkLog::load(&options.log)?;
    let id = log.add_task(&options.description, options.date)?;

    let output = AddOutput {
        id: id.to_string(),
        date: format_date(options.date),
        description: options.description.trim().to_string(),
    };

    let mut receipt = Receipt::new(format!("Task added: {}", output.description));
    receipt.field("id", output.id.clone());
    receipt.field("date", output.date.clone());

    emit_success(options.output, "add", &output, Some(&receipt))
}

pub fn run_action(options: ActionOptions, clock: &dyn Clock) -> Result<()> {
    let mut log = WorkLog::load(&options.log)?;
    let (task, transition) = log.apply(&options.task, options.date, &options.action, clock)?;
    let record = TaskRecord::from(task);

    let applied = transition == Transition::Applied;
    if applied {
        log.persist()?;
    }

    let output = ActionOutput {
        action: options.action.name(),
        date: format_date(options.date),
        applied,
        task: record,
    };

    let mut receipt = Receipt::new(format!(
        "{}: {}",
        header(&options.action, applied),
        output.task.description
    ));
    receipt.field("id", output.task.uuid.clone());
    receipt.field("status", output.task.status.clone());
    if let Action::Note(text) = &options.action {
        receipt.field("note", text.clone());
    }
    if let Some(warning) = transition.warning() {
        receipt.warn(warning);
    }

    emit_success(options.output, options.action.name(), &output, Some(&receipt))
}

fn header(action: &Action, applied: bool) -> &'static str {
    if !applied {
        return "Task unchanged";
    }
    match action {
        Action::Start => "Task started",
        Action::Pause => "Task paused",
        Action::Complete => "Task completed",
        Action::Note(_) => "Note added",
    }
}
