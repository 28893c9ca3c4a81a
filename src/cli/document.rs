//! worklog pdf command implementation.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::DocumentConfig;
use crate::document;
use crate::error::Result;
use crate::output::{emit_success, OutputOptions, Receipt};
use crate::store::{month_bounds, WorkLog};

pub struct PdfOptions {
    pub log: PathBuf,
    pub date: NaiveDate,
    pub config: DocumentConfig,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct PdfOutput {
    month: String,
    path: String,
}

pub fn run(options: PdfOptions, clock: &dyn Clock) -> Result<()> {
    let log = WorkLog::load(&options.log)?;
    let path = document::build_monthly(&log, options.date, &options.config, clock)?;

    let (first, _) = month_bounds(options.date);
    let output = PdfOutput {
        month: first.format("%Y-%m").to_string(),
        path: path.display().to_string(),
    };

    let mut receipt = Receipt::new(format!("Document written for {}", output.month));
    receipt.field("path", output.path.clone());

    emit_success(options.output, "pdf", &output, Some(&receipt))
}
