//! On-disk shape of a task.
//!
//! ```toml
//! [[2024-07-03]]
//! uuid = "5f0c..."
//! description = "Write report"
//! status = "PAUSED"
//! times = [["2024-07-03T09:00", "2024-07-03T09:45"], ["2024-07-03T13:10", "none"]]
//! notes = ["sent draft"]
//! ```
//!
//! Timestamps are UTC without seconds or offset; an open interval ends in `none`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::task::{Interval, Task, TaskStatus};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TIMESTAMP_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
pub const OPEN_END: &str = "none";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub uuid: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub times: Vec<[String; 2]>,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Only emitted by reports; ignored when read back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
}

impl TaskRecord {
    /// Record plus elapsed minutes, as shown by the JSON report.
    pub fn with_minutes(task: &Task, clock: &dyn Clock) -> Result<Self> {
        let mut record = Self::from(task);
        record.minutes = Some(task.elapsed_minutes(clock)?);
        Ok(record)
    }

    pub fn into_task(self) -> Result<Task> {
        let id = Uuid::parse_str(self.uuid.trim())
            .map_err(|err| Error::InvalidArgument(format!("invalid uuid '{}': {err}", self.uuid)))?;
        let status: TaskStatus = self.status.parse()?;
        let intervals = self
            .times
            .iter()
            .map(|[start, end]| {
                let start = parse_timestamp(start)?;
                let end = if end.trim().eq_ignore_ascii_case(OPEN_END) {
                    None
                } else {
                    Some(parse_timestamp(end)?)
                };
                Ok(Interval { start, end })
            })
            .collect::<Result<Vec<_>>>()?;
        Task::from_parts(id, self.description, status, intervals, self.notes)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        let times = task
            .intervals()
            .iter()
            .map(|interval| {
                let end = interval
                    .end
                    .map(format_timestamp)
                    .unwrap_or_else(|| OPEN_END.to_string());
                [format_timestamp(interval.start), end]
            })
            .collect();
        Self {
            uuid: task.id().to_string(),
            description: task.description().to_string(),
            status: task.status().to_string(),
            times,
            notes: task.notes().to_vec(),
            minutes: None,
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_SECONDS))
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            Error::InvalidArgument(format!(
                "invalid timestamp '{raw}' (expected YYYY-MM-DDTHH:MM)"
            ))
        })
}
