//! Tasks and their lifecycle.
//!
//! A task belongs to one calendar day and accumulates work intervals while it
//! moves through `CREATED -> RUNNING <-> PAUSED -> COMPLETED`. Elapsed time is
//! the sum of its intervals, with an open interval measured up to "now".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Error, Result};

const NOT_RUNNING: &str = "Task is not running";
const ALREADY_COMPLETED: &str = "Task is already completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Created,
    Running,
    Paused,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "CREATED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Paused => "PAUSED",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Ok(TaskStatus::Created),
            "RUNNING" => Ok(TaskStatus::Running),
            "PAUSED" => Ok(TaskStatus::Paused),
            "COMPLETED" => Ok(TaskStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown task status '{other}' (expected CREATED|RUNNING|PAUSED|COMPLETED)"
            ))),
        }
    }
}

/// A stretch of continuous work. `end` is unset while the work is ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl Interval {
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Whole seconds covered by this interval, measuring an open end at `now`.
    pub fn seconds(&self, now: DateTime<Utc>) -> Result<i64> {
        checked_seconds(self.start, self.end.unwrap_or(now))
    }
}

fn checked_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
    if end < start {
        return Err(Error::TemporalInvariant(format!(
            "interval ends at {} before it starts at {}",
            end.format("%Y-%m-%dT%H:%M:%S"),
            start.format("%Y-%m-%dT%H:%M:%S")
        )));
    }
    if end.date_naive() != start.date_naive() {
        return Err(Error::TemporalInvariant(format!(
            "interval started on {} but ends on {}",
            start.date_naive(),
            end.date_naive()
        )));
    }
    Ok((end - start).num_seconds())
}

/// Result of a lifecycle request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Nothing changed; the task was in a state the request does not apply to.
    Skipped {
        status: TaskStatus,
        reason: &'static str,
    },
}

impl Transition {
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Transition::Applied => None,
            Transition::Skipped { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: Uuid,
    description: String,
    status: TaskStatus,
    intervals: Vec<Interval>,
    notes: Vec<String>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            status: TaskStatus::Created,
            intervals: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Rebuild a task from stored parts. Only the last interval may be open.
    pub fn from_parts(
        id: Uuid,
        description: String,
        status: TaskStatus,
        intervals: Vec<Interval>,
        notes: Vec<String>,
    ) -> Result<Self> {
        let open_before_last = intervals
            .iter()
            .rev()
            .skip(1)
            .any(|interval| interval.is_open());
        if open_before_last {
            return Err(Error::InvalidState(format!(
                "{id} has an open interval that is not the last one"
            )));
        }
        Ok(Self {
            id,
            description,
            status,
            intervals,
            notes,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Total worked seconds, an open interval counting up to `now`.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> Result<i64> {
        self.intervals
            .iter()
            .map(|interval| interval.seconds(now))
            .sum()
    }

    pub fn elapsed_minutes(&self, clock: &dyn Clock) -> Result<f64> {
        Ok(self.elapsed_seconds(clock.now())? as f64 / 60.0)
    }

    pub fn start(&mut self, clock: &dyn Clock) -> Result<Transition> {
        match self.status {
            TaskStatus::Completed => {
                warn!(task = %self.id, "start ignored: task already completed");
                return Ok(Transition::Skipped {
                    status: self.status,
                    reason: ALREADY_COMPLETED,
                });
            }
            TaskStatus::Running => {
                return Err(Error::InvalidState(format!(
                    "{} is already running; a second open interval is not allowed",
                    self.id
                )));
            }
            TaskStatus::Created | TaskStatus::Paused => {}
        }

        if let Some(last) = self.intervals.last() {
            if last.is_open() {
                return Err(Error::InvalidState(format!(
                    "{} is {} but its last interval is still open",
                    self.id, self.status
                )));
            }
        }

        let now = clock.now();
        self.status = TaskStatus::Running;
        self.intervals.push(Interval::open(now));
        info!(task = %self.id, "task started");
        Ok(Transition::Applied)
    }

    pub fn pause(&mut self, clock: &dyn Clock) -> Result<Transition> {
        self.close_interval(TaskStatus::Paused, clock)
    }

    pub fn complete(&mut self, clock: &dyn Clock) -> Result<Transition> {
        self.close_interval(TaskStatus::Completed, clock)
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    fn close_interval(&mut self, next: TaskStatus, clock: &dyn Clock) -> Result<Transition> {
        if self.status != TaskStatus::Running {
            warn!(task = %self.id, status = %self.status, "{} ignored: task not running", next);
            return Ok(Transition::Skipped {
                status: self.status,
                reason: NOT_RUNNING,
            });
        }

        let now = clock.now();
        let id = self.id;
        let last = match self.intervals.last_mut() {
            Some(last) if last.is_open() => last,
            Some(_) => {
                return Err(Error::InvalidState(format!(
                    "{id} is running but its last interval is already closed"
                )));
            }
            None => {
                return Err(Error::InvalidState(format!(
                    "{id} is running but has no intervals"
                )));
            }
        };

        // Refuse before mutating so a bad close never reaches the log.
        checked_seconds(last.start, now)?;
        last.end = Some(now);
        self.status = next;
        info!(task = %id, status = %next, "task interval closed");
        Ok(Transition::Applied)
    }
}

/// Names accepted for [`Action`] on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Start,
    Pause,
    Complete,
    Note,
}

impl ActionKind {
    pub const NAMES: [&'static str; 4] = ["start", "pause", "complete", "note"];
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(ActionKind::Start),
            "pause" => Ok(ActionKind::Pause),
            "complete" => Ok(ActionKind::Complete),
            "note" => Ok(ActionKind::Note),
            other => Err(Error::InvalidArgument(format!(
                "unknown action '{other}' (expected {})",
                Self::NAMES.join("|")
            ))),
        }
    }
}

/// A lifecycle request against one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Complete,
    Note(String),
}

impl Action {
    pub fn new(kind: ActionKind, note: Option<String>) -> Result<Self> {
        match kind {
            ActionKind::Start => Ok(Action::Start),
            ActionKind::Pause => Ok(Action::Pause),
            ActionKind::Complete => Ok(Action::Complete),
            ActionKind::Note => Self::note(note.unwrap_or_default()),
        }
    }

    pub fn note(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "note text cannot be empty".to_string(),
            ));
        }
        Ok(Action::Note(text))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Complete => "complete",
            Action::Note(_) => "note",
        }
    }

    pub fn apply(&self, task: &mut Task, clock: &dyn Clock) -> Result<Transition> {
        match self {
            Action::Start => task.start(clock),
            Action::Pause => task.pause(clock),
            Action::Complete => task.complete(clock),
            Action::Note(text) => {
                task.add_note(text.clone());
                Ok(Transition::Applied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 3, h, m, s).unwrap()
    }

    #[test]
    fn write_report_scenario() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::new("Write report");
        assert_eq!(task.status(), TaskStatus::Created);
        assert!(task.intervals().is_empty());

        assert_eq!(task.start(&clock).unwrap(), Transition::Applied);
        assert_eq!(task.status(), TaskStatus::Running);
        assert_eq!(task.intervals().len(), 1);
        assert!(task.intervals()[0].is_open());

        clock.advance(Duration::seconds(90));
        task.pause(&clock).unwrap();
        assert_eq!(task.status(), TaskStatus::Paused);
        assert!((task.elapsed_minutes(&clock).unwrap() - 1.5).abs() < f64::EPSILON);

        clock.advance(Duration::minutes(10));
        task.start(&clock).unwrap();
        assert_eq!(task.intervals().len(), 2);
        assert!(task.intervals()[1].is_open());

        clock.advance(Duration::seconds(150));
        task.complete(&clock).unwrap();
        assert_eq!(task.status(), TaskStatus::Completed);
        assert!(task.intervals().iter().all(|interval| !interval.is_open()));
        assert!((task.elapsed_minutes(&clock).unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pause_closes_only_the_open_interval() {
        let clock = ManualClock::new(at(9, 0, 0));
        let first = Interval::closed(at(8, 0, 0), at(8, 30, 0));
        let mut task = Task::from_parts(
            Uuid::new_v4(),
            "x".to_string(),
            TaskStatus::Paused,
            vec![first],
            Vec::new(),
        )
        .unwrap();

        task.start(&clock).unwrap();
        clock.advance(Duration::minutes(5));
        task.pause(&clock).unwrap();

        assert_eq!(task.intervals()[0], first);
        assert_eq!(
            task.intervals()[1],
            Interval::closed(at(9, 0, 0), at(9, 5, 0))
        );
    }

    #[test]
    fn open_interval_counts_up_to_now() {
        let clock = ManualClock::new(at(10, 0, 0));
        let mut task = Task::new("running");
        task.start(&clock).unwrap();
        clock.advance(Duration::minutes(3));
        assert!((task.elapsed_minutes(&clock).unwrap() - 3.0).abs() < f64::EPSILON);
        assert!(task.intervals()[0].is_open());
    }

    #[test]
    fn elapsed_is_independent_of_interval_order() {
        let a = Interval::closed(at(8, 0, 0), at(8, 0, 45));
        let b = Interval::closed(at(11, 0, 0), at(11, 20, 0));
        let forward = Task::from_parts(
            Uuid::new_v4(),
            "f".into(),
            TaskStatus::Paused,
            vec![a, b],
            vec![],
        )
        .unwrap();
        let backward = Task::from_parts(
            Uuid::new_v4(),
            "b".into(),
            TaskStatus::Paused,
            vec![b, a],
            vec![],
        )
        .unwrap();
        let now = at(12, 0, 0);
        assert_eq!(forward.elapsed_seconds(now).unwrap(), 45 + 20 * 60);
        assert_eq!(
            forward.elapsed_seconds(now).unwrap(),
            backward.elapsed_seconds(now).unwrap()
        );
    }

    #[test]
    fn pause_when_not_running_is_a_soft_noop() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::new("idle");
        let outcome = task.pause(&clock).unwrap();
        assert_eq!(
            outcome,
            Transition::Skipped {
                status: TaskStatus::Created,
                reason: NOT_RUNNING,
            }
        );
        assert_eq!(outcome.warning(), Some("Task is not running"));
        assert_eq!(task.status(), TaskStatus::Created);
        assert!(task.intervals().is_empty());

        let outcome = task.complete(&clock).unwrap();
        assert!(matches!(outcome, Transition::Skipped { .. }));
        assert_eq!(task.status(), TaskStatus::Created);
    }

    #[test]
    fn start_while_running_is_invalid_state() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::new("busy");
        task.start(&clock).unwrap();
        let err = task.start(&clock).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(task.intervals().len(), 1);
    }

    #[test]
    fn start_with_dangling_open_interval_is_invalid_state() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::from_parts(
            Uuid::new_v4(),
            "corrupt".into(),
            TaskStatus::Paused,
            vec![Interval::open(at(8, 0, 0))],
            vec![],
        )
        .unwrap();
        assert!(matches!(
            task.start(&clock).unwrap_err(),
            Error::InvalidState(_)
        ));
    }

    #[test]
    fn pause_with_closed_last_interval_is_invalid_state() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::from_parts(
            Uuid::new_v4(),
            "corrupt".into(),
            TaskStatus::Running,
            vec![Interval::closed(at(8, 0, 0), at(8, 10, 0))],
            vec![],
        )
        .unwrap();
        assert!(matches!(
            task.pause(&clock).unwrap_err(),
            Error::InvalidState(_)
        ));
        assert_eq!(task.status(), TaskStatus::Running);
    }

    #[test]
    fn start_after_completion_is_skipped() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::new("done");
        task.start(&clock).unwrap();
        task.complete(&clock).unwrap();
        let outcome = task.start(&clock).unwrap();
        assert_eq!(outcome.warning(), Some("Task is already completed"));
        assert_eq!(task.intervals().len(), 1);
    }

    #[test]
    fn open_interval_before_last_is_rejected() {
        let err = Task::from_parts(
            Uuid::new_v4(),
            "broken".into(),
            TaskStatus::Running,
            vec![Interval::open(at(8, 0, 0)), Interval::open(at(9, 0, 0))],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn interval_crossing_midnight_is_rejected() {
        let late = Utc.with_ymd_and_hms(2024, 7, 3, 23, 50, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 7, 4, 0, 10, 0).unwrap();
        let task = Task::from_parts(
            Uuid::new_v4(),
            "late".into(),
            TaskStatus::Paused,
            vec![Interval::closed(late, next_day)],
            vec![],
        )
        .unwrap();
        assert!(matches!(
            task.elapsed_seconds(next_day).unwrap_err(),
            Error::TemporalInvariant(_)
        ));
    }

    #[test]
    fn pause_past_midnight_fails_without_mutation() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 3, 23, 50, 0).unwrap());
        let mut task = Task::new("overnight");
        task.start(&clock).unwrap();
        clock.advance(Duration::minutes(20));

        let err = task.pause(&clock).unwrap_err();
        assert!(matches!(err, Error::TemporalInvariant(_)));
        assert_eq!(task.status(), TaskStatus::Running);
        assert!(task.intervals()[0].is_open());
        assert!(matches!(
            task.elapsed_minutes(&clock).unwrap_err(),
            Error::TemporalInvariant(_)
        ));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let interval = Interval::closed(at(10, 0, 0), at(9, 0, 0));
        assert!(matches!(
            interval.seconds(at(12, 0, 0)).unwrap_err(),
            Error::TemporalInvariant(_)
        ));
    }

    #[test]
    fn notes_append_in_any_state() {
        let clock = ManualClock::new(at(9, 0, 0));
        let mut task = Task::new("notes");
        Action::note("first").unwrap().apply(&mut task, &clock).unwrap();
        task.start(&clock).unwrap();
        task.complete(&clock).unwrap();
        Action::note("second").unwrap().apply(&mut task, &clock).unwrap();
        assert_eq!(task.notes(), ["first".to_string(), "second".to_string()]);
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn action_parsing_rejects_unknown_names() {
        assert_eq!("Start".parse::<ActionKind>().unwrap(), ActionKind::Start);
        assert!(matches!(
            "resume".parse::<ActionKind>().unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(
            Action::new(ActionKind::Note, None).unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert_eq!(
            Action::new(ActionKind::Note, Some("hi".into())).unwrap(),
            Action::Note("hi".into())
        );
    }
}
