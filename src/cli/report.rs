//! worklog report command implementations.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::error::Result;
use crate::output::{emit_success, emit_text, OutputOptions};
use crate::record::TaskRecord;
use crate::report::{self, ReportFormat};
use crate::store::{format_date, WorkLog};

pub struct DailyOptions {
    pub log: PathBuf,
    pub date: NaiveDate,
    pub format: ReportFormat,
    pub output: OutputOptions,
}

pub struct MonthlyOptions {
    pub log: PathBuf,
    pub date: NaiveDate,
    pub output: OutputOptions,
}

pub struct ErrorsOptions {
    pub log: PathBuf,
    pub today: NaiveDate,
    pub output: OutputOptions,
}

/// `--format json` prints the bare record array; `--json` wraps the same
/// records in the usual envelope.
pub fn run_daily(options: DailyOptions, clock: &dyn Clock) -> Result<()> {
    let log = WorkLog::load(&options.log)?;
    let tasks = log.tasks_for(options.date);
    if options.output.json {
        let records = tasks
            .iter()
            .map(|task| TaskRecord::with_minutes(task, clock))
            .collect::<Result<Vec<_>>>()?;
        return emit_success(options.output, "report", &records, None);
    }
    let text = report::daily(tasks, options.format, clock)?;
    if options.format == ReportFormat::Json {
        println!("{text}");
        return Ok(());
    }
    emit_text(options.output, &text);
    Ok(())
}

pub fn run_monthly(options: MonthlyOptions, clock: &dyn Clock) -> Result<()> {
    let log = WorkLog::load(&options.log)?;
    if options.output.json {
        let summary = report::monthly_summary(&log, options.date, clock)?;
        return emit_success(options.output, "monthly", &summary, None);
    }
    let text = report::monthly(&log, options.date, clock)?;
    emit_text(options.output, &text);
    Ok(())
}

pub fn run_errors(options: ErrorsOptions) -> Result<()> {
    let log = WorkLog::load(&options.log)?;
    let scan = log.scan_errors(options.today);

    if options.output.json {
        let data: BTreeMap<String, Vec<TaskRecord>> = scan
            .iter()
            .map(|(date, tasks)| {
                let records = tasks.iter().map(|task| TaskRecord::from(*task)).collect();
                (format_date(*date), records)
            })
            .collect();
        return emit_success(options.output, "errors", &data, None);
    }

    let highlight = std::io::stdout().is_terminal();
    emit_text(options.output, &report::errors(&scan, highlight));
    Ok(())
}
