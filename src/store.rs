//! The work log document.
//!
//! A single TOML file. Every top-level key holding a list is a day
//! (`YYYY-MM-DD`) of task records; every other key is metadata that is carried
//! through untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::record::TaskRecord;
use crate::storage;
use crate::task::{Action, Task, Transition};

/// Metadata written into a freshly created log
pub const INITIAL_VERSION: &str = "0.0.0";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct WorkLog {
    path: PathBuf,
    metadata: toml::Table,
    days: BTreeMap<NaiveDate, Vec<Task>>,
}

impl WorkLog {
    /// Read the log at `path`, creating it with only a version tag if absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let mut initial = toml::Table::new();
            initial.insert(
                "version".to_string(),
                toml::Value::String(INITIAL_VERSION.to_string()),
            );
            storage::write_atomic_str(path, &toml::to_string(&initial)?)?;
            info!(path = %path.display(), "created work log");
        }
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Build a log from TOML text; `path` is where [`WorkLog::persist`] writes.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table: toml::Table = content.parse()?;
        let mut metadata = toml::Table::new();
        let mut days = BTreeMap::new();

        for (key, value) in table {
            let items = match value {
                toml::Value::Array(items) => items,
                other => {
                    // A day key holding anything else would be replaced on the next write.
                    if is_day_key(&key) {
                        return Err(invalid_log(
                            &path,
                            format!("day '{key}' must hold a list of tasks"),
                        ));
                    }
                    metadata.insert(key, other);
                    continue;
                }
            };
            let date = parse_date(&key)
                .ok()
                .filter(|date| format_date(*date) == key)
                .ok_or_else(|| {
                    invalid_log(&path, format!("list-valued key '{key}' is not a YYYY-MM-DD date"))
                })?;
            if days.contains_key(&date) {
                return Err(invalid_log(&path, format!("day '{key}' appears more than once")));
            }
            let tasks = items
                .into_iter()
                .map(|item| {
                    let record: TaskRecord = item
                        .try_into()
                        .map_err(|err| invalid_log(&path, format!("{key}: {err}")))?;
                    record.into_task().map_err(|err| match err {
                        Error::InvalidArgument(message) => {
                            invalid_log(&path, format!("{key}: {message}"))
                        }
                        other => other,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            days.insert(date, tasks);
        }

        debug!(path = %path.display(), days = days.len(), "loaded work log");
        Ok(Self {
            path,
            metadata,
            days,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &toml::Table {
        &self.metadata
    }

    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<Task>> {
        &self.days
    }

    pub fn tasks_for(&self, date: NaiveDate) -> &[Task] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Create a task on `date`, write the log and return the new identifier.
    pub fn add_task(&mut self, description: &str, date: NaiveDate) -> Result<Uuid> {
        let description = description.trim();
        if description.is_empty() {
            return Err(Error::InvalidArgument(
                "task description cannot be empty".to_string(),
            ));
        }
        let task = Task::new(description);
        let id = task.id();
        self.days.entry(date).or_default().push(task);
        self.persist()?;
        info!(task = %id, %date, "task added");
        Ok(id)
    }

    /// The single task on `date` whose identifier contains `fragment`.
    pub fn find_task(&self, fragment: &str, date: NaiveDate) -> Result<&Task> {
        let index = self.resolve(fragment, date)?;
        Ok(&self.tasks_for(date)[index])
    }

    pub fn find_task_mut(&mut self, fragment: &str, date: NaiveDate) -> Result<&mut Task> {
        let index = self.resolve(fragment, date)?;
        self.days
            .get_mut(&date)
            .and_then(|tasks| tasks.get_mut(index))
            .ok_or_else(|| not_found(fragment, date))
    }

    /// Resolve `fragment` on `date` and run `action` against it in memory.
    pub fn apply(
        &mut self,
        fragment: &str,
        date: NaiveDate,
        action: &Action,
        clock: &dyn Clock,
    ) -> Result<(&Task, Transition)> {
        let task = self.find_task_mut(fragment, date)?;
        let outcome = action.apply(task, clock)?;
        Ok((&*task, outcome))
    }

    /// Dates in the calendar month of `reference`, ascending.
    pub fn month(&self, reference: NaiveDate) -> impl Iterator<Item = (NaiveDate, &[Task])> + '_ {
        let (first, next) = month_bounds(reference);
        self.days
            .range(first..next)
            .map(|(date, tasks)| (*date, tasks.as_slice()))
    }

    /// Incomplete tasks on every date other than `today`.
    pub fn scan_errors(&self, today: NaiveDate) -> Vec<(NaiveDate, Vec<&Task>)> {
        self.days
            .iter()
            .filter(|(date, _)| **date != today)
            .filter_map(|(date, tasks)| {
                let stale: Vec<&Task> = tasks
                    .iter()
                    .filter(|task| !task.status().is_completed())
                    .collect();
                (!stale.is_empty()).then_some((*date, stale))
            })
            .collect()
    }

    /// Serialize metadata followed by every day, oldest first.
    pub fn to_toml_string(&self) -> Result<String> {
        let mut document = self.metadata.clone();
        for (date, tasks) in &self.days {
            let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
            document.insert(format_date(*date), toml::Value::try_from(records)?);
        }
        Ok(toml::to_string(&document)?)
    }

    /// Overwrite the backing file with the in-memory state.
    pub fn persist(&self) -> Result<()> {
        let content = self.to_toml_string()?;
        storage::write_atomic_str(&self.path, &content)?;
        debug!(path = %self.path.display(), "persisted work log");
        Ok(())
    }

    fn resolve(&self, fragment: &str, date: NaiveDate) -> Result<usize> {
        let needle = fragment.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(Error::InvalidArgument(
                "task identifier fragment cannot be empty".to_string(),
            ));
        }

        let matches: Vec<(usize, &Task)> = self
            .tasks_for(date)
            .iter()
            .enumerate()
            .filter(|(_, task)| task.id().to_string().contains(&needle))
            .collect();

        match matches.as_slice() {
            [] => Err(not_found(fragment, date)),
            [(index, _)] => Ok(*index),
            _ => Err(Error::Ambiguous {
                fragment: fragment.trim().to_string(),
                date: format_date(date),
                matches: matches.iter().map(|(_, task)| task.id().to_string()).collect(),
            }),
        }
    }
}

/// `[first day of month, first day of next month)` for `reference`.
pub fn month_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = reference - Days::new(u64::from(reference.day0()));
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (first, next)
}

pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn is_day_key(key: &str) -> bool {
    parse_date(key).is_ok_and(|date| format_date(date) == key)
}

fn not_found(fragment: &str, date: NaiveDate) -> Error {
    Error::NotFound {
        fragment: fragment.trim().to_string(),
        date: format_date(date),
    }
}

fn invalid_log(path: &Path, message: String) -> Error {
    Error::InvalidLog {
        path: path.to_path_buf(),
        message,
    }
}
