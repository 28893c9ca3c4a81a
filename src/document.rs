//! Monthly work log as a typeset document.
//!
//! The month is rendered to LaTeX and compiled by an external engine
//! (`pdflatex` by default). The engine runs once, blocking; any failure is
//! reported as [`Error::DocumentBuild`].

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::DocumentConfig;
use crate::error::{Error, Result};
use crate::report::{format_total, total_minutes};
use crate::store::{format_date, month_bounds, WorkLog};
use crate::task::Task;

const SOURCE_NAME: &str = "work_log.tex";
const OUTPUT_NAME: &str = "work_log.pdf";
const LOG_TAIL_LINES: usize = 20;

/// Escape LaTeX specials in plain words; words starting with `http` become links.
pub fn escape_markup(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if word.starts_with("http") {
                format!("\\href{{{}}}{{link}}", escape_url(word))
            } else {
                escape_word(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for ch in word.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

fn escape_url(url: &str) -> String {
    url.replace('%', "\\%").replace('#', "\\#")
}

fn task_item(task: &Task) -> String {
    let mut item = escape_markup(task.description());
    if !task.notes().is_empty() {
        item.push_str("\n\\begin{itemize}");
        for note in task.notes() {
            let _ = write!(item, "\n\\item {}", escape_markup(note));
        }
        item.push_str("\n\\end{itemize}");
    }
    item
}

/// Full LaTeX source for the given days.
pub fn render_monthly(days: &[(NaiveDate, &[Task])], title: &str, summary: &str) -> String {
    let mut tex = String::new();
    tex.push_str("\\documentclass[11pt]{article}\n");
    tex.push_str("\\usepackage[utf8]{inputenc}\n");
    tex.push_str("\\usepackage[margin=2cm]{geometry}\n");
    tex.push_str("\\usepackage{hyperref}\n");
    let _ = writeln!(tex, "\\title{{{}}}", escape_markup(title));
    tex.push_str("\\date{}\n");
    tex.push_str("\\begin{document}\n");
    tex.push_str("\\maketitle\n");
    for (date, tasks) in days {
        let _ = writeln!(tex, "\\section*{{{}}}", format_date(*date));
        if tasks.is_empty() {
            continue;
        }
        tex.push_str("\\begin{itemize}\n");
        for task in *tasks {
            let _ = writeln!(tex, "\\item {}", task_item(task));
        }
        tex.push_str("\\end{itemize}\n");
    }
    let _ = writeln!(tex, "\\paragraph{{}} {}", escape_markup(summary));
    tex.push_str("\\end{document}\n");
    tex
}

/// Where the document for `year`/`month` ends up.
pub fn output_path(output_dir: &Path, year: i32, month: u32) -> PathBuf {
    output_dir.join(format!("Work_Log_For_{year}_{month}.pdf"))
}

/// Render the month containing `reference` and compile it.
pub fn build_monthly(
    log: &WorkLog,
    reference: NaiveDate,
    config: &DocumentConfig,
    clock: &dyn Clock,
) -> Result<PathBuf> {
    let (first, _) = month_bounds(reference);
    let days: Vec<(NaiveDate, &[Task])> = log.month(reference).collect();
    let total = total_minutes(days.iter().flat_map(|(_, tasks)| tasks.iter()), clock)?;
    let title = format!("Work Log {}", first.format("%B %Y"));
    let tex = render_monthly(&days, &title, &format_total(total));
    compile(
        config,
        &tex,
        &output_path(&config.output_dir(), first.year(), first.month()),
    )
}

/// Run the engine on `tex` in a scratch directory and move the result to `target`.
pub fn compile(config: &DocumentConfig, tex: &str, target: &Path) -> Result<PathBuf> {
    let workdir = tempfile::tempdir()?;
    let source = workdir.path().join(SOURCE_NAME);
    fs::write(&source, tex)?;

    debug!(engine = %config.engine, source = %source.display(), "running document engine");
    let output = Command::new(&config.engine)
        .args(&config.engine_args)
        .arg("-output-directory")
        .arg(workdir.path())
        .arg(&source)
        .current_dir(workdir.path())
        .output()
        .map_err(|err| {
            Error::DocumentBuild(format!("could not run '{}': {err}", config.engine))
        })?;

    if !output.status.success() {
        return Err(Error::DocumentBuild(format!(
            "'{}' exited with {}:\n{}",
            config.engine,
            output.status,
            log_tail(&output.stdout, &output.stderr)
        )));
    }

    let produced = workdir.path().join(OUTPUT_NAME);
    if !produced.exists() {
        return Err(Error::DocumentBuild(format!(
            "'{}' finished but produced no {OUTPUT_NAME}",
            config.engine
        )));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    // rename fails across filesystems; the scratch dir is often on tmpfs
    fs::copy(&produced, target)?;
    info!(path = %target.display(), "document written");
    Ok(target.to_path_buf())
}

fn log_tail(stdout: &[u8], stderr: &[u8]) -> String {
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(stdout),
        String::from_utf8_lossy(stderr)
    );
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    lines[start..].join("\n")
}
