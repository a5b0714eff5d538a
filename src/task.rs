//! Task data structure and related records.
//!
//! This module defines the core `Task` struct together with the records that
//! hang off a task (attachments, comments, activity entries and the daily
//! completions of weekly recurring tasks), and the validated inputs used to
//! create and edit tasks.

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::*;

/// Numeric progress towards a goal, e.g. "3 of 5 chapters".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progress {
    pub target: u32,
    pub current: u32,
}

impl Progress {
    pub fn new(target: u32, current: u32) -> Result<Self> {
        if target == 0 {
            return Err(Error::Validation("Progress target must be at least 1".into()));
        }
        if current > target {
            return Err(Error::Validation(format!(
                "Progress {current} exceeds target {target}"
            )));
        }
        Ok(Progress { target, current })
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }
}

/// A single item on the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub progress: Option<Progress>,
    /// Sort key within the category. Sparse; only relative order matters.
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub recurrence_weeks: Option<u32>,
    #[serde(default)]
    pub owner: String,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Task {
    /// Key that puts tasks of one category into display order.
    pub fn display_key(&self) -> (i64, i64, u64) {
        (self.order, self.created_at_utc, self.id)
    }

    /// Calendar day the task was created on, in local time like [`crate::db::today`].
    pub fn created_date(&self) -> NaiveDate {
        DateTime::from_timestamp(self.created_at_utc, 0)
            .map(|dt| dt.with_timezone(&Local).date_naive())
            .unwrap_or_default()
    }

    /// Half-open date range a weekly recurring task is live for.
    ///
    /// `None` when the task does not recur or the window runs off the calendar.
    pub fn recurrence_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let weeks = self.recurrence_weeks?;
        let start = self.created_date();
        let end = start.checked_add_signed(Duration::try_weeks(i64::from(weeks))?)?;
        Some((start, end))
    }

    pub fn recurs_on(&self, date: NaiveDate) -> bool {
        self.recurrence_window()
            .map(|(start, end)| date >= start && date < end)
            .unwrap_or(false)
    }
}

/// Longest run a weekly recurring task may be scheduled for (ten years).
pub const MAX_RECURRENCE_WEEKS: u32 = 520;

/// Trim a title and reject it if nothing is left.
pub fn validate_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::Validation("Task title cannot be empty".into()));
    }
    Ok(title.to_string())
}

/// Bring `recurrence_weeks` in line with the category it is paired with.
///
/// Weekly recurring tasks default to a single week; every other category
/// carries no recurrence at all.
pub fn normalise_recurrence(category: Category, weeks: Option<u32>) -> Result<Option<u32>> {
    match (category.is_recurring(), weeks) {
        (true, None) => Ok(Some(1)),
        (true, Some(0)) => Err(Error::Validation("Recurrence must be at least 1 week".into())),
        (true, Some(w)) if w > MAX_RECURRENCE_WEEKS => Err(Error::Validation(format!(
            "Recurrence of {w} weeks is too long (at most {MAX_RECURRENCE_WEEKS})"
        ))),
        (true, Some(w)) => Ok(Some(w)),
        (false, None) => Ok(None),
        (false, Some(_)) => Err(Error::Validation(format!(
            "Only weekly-recurring tasks can repeat; '{category}' tasks cannot"
        ))),
    }
}

fn normalise_text(s: Option<String>) -> Option<String> {
    s.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

/// Input for creating a task, as collected from the add form.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub status: Status,
    pub priority: Priority,
    pub due: Option<NaiveDate>,
    pub progress_target: Option<u32>,
    pub recurrence_weeks: Option<u32>,
    /// Insert position within the category; `None` appends.
    pub position: Option<usize>,
}

/// Creation input after validation, ready to be stamped with id and order.
#[derive(Debug, Clone)]
pub struct ValidTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub status: Status,
    pub priority: Priority,
    pub due: Option<NaiveDate>,
    pub progress: Option<Progress>,
    pub recurrence_weeks: Option<u32>,
    pub position: Option<usize>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..NewTask::default()
        }
    }

    pub fn validate(self, default_category: Category) -> Result<ValidTask> {
        let title = validate_title(&self.title)?;
        let category = self.category.unwrap_or(default_category);
        let recurrence_weeks = normalise_recurrence(category, self.recurrence_weeks)?;
        let progress = self.progress_target.map(|t| Progress::new(t, 0)).transpose()?;
        Ok(ValidTask {
            title,
            description: normalise_text(self.description),
            category,
            status: self.status,
            priority: self.priority,
            due: self.due,
            progress,
            recurrence_weeks,
            position: self.position,
        })
    }
}

/// Field changes for an existing task. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
    pub clear_due: bool,
    pub progress_target: Option<u32>,
    pub progress_current: Option<u32>,
    pub clear_progress: bool,
    pub recurrence_weeks: Option<u32>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due.is_none()
            && !self.clear_due
            && self.progress_target.is_none()
            && self.progress_current.is_none()
            && !self.clear_progress
            && self.recurrence_weeks.is_none()
    }

    /// Apply onto `task`, validating the result. `task` is left untouched on error.
    pub fn apply_to(&self, task: &mut Task) -> Result<Vec<&'static str>> {
        let mut next = task.clone();
        let mut changed = Vec::new();

        if let Some(t) = &self.title {
            next.title = validate_title(t)?;
            changed.push("title");
        }
        if let Some(d) = &self.description {
            next.description = normalise_text(Some(d.clone()));
            changed.push("description");
        }
        if let Some(p) = self.priority {
            next.priority = p;
            changed.push("priority");
        }
        if self.clear_due {
            next.due = None;
            changed.push("due");
        }
        if let Some(d) = self.due {
            next.due = Some(d);
            if !changed.contains(&"due") {
                changed.push("due");
            }
        }
        if self.clear_progress {
            next.progress = None;
            changed.push("progress");
        }
        if self.progress_target.is_some() || self.progress_current.is_some() {
            let existing = next.progress;
            let target = self
                .progress_target
                .or(existing.map(|p| p.target))
                .ok_or_else(|| Error::Validation("Set a progress target before recording progress".into()))?;
            let current = self
                .progress_current
                .or(existing.map(|p| p.current.min(target)))
                .unwrap_or(0);
            next.progress = Some(Progress::new(target, current)?);
            if !changed.contains(&"progress") {
                changed.push("progress");
            }
        }
        if let Some(w) = self.recurrence_weeks {
            next.recurrence_weeks = normalise_recurrence(next.category, Some(w))?;
            changed.push("recurrence");
        }

        *task = next;
        Ok(changed)
    }
}

/// Metadata about a file linked to a task. The file itself stays where it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: u64,
    pub task_id: u64,
    pub file_name: String,
    pub path: String,
    pub size_bytes: u64,
    pub added_at_utc: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub task_id: u64,
    pub body: String,
    pub owner: String,
    pub created_at_utc: i64,
}

/// One entry in the activity trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub task_id: u64,
    pub kind: ActivityKind,
    pub detail: String,
    pub owner: String,
    pub at_utc: i64,
}

/// A weekly recurring task ticked off for one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCompletion {
    pub task_id: u64,
    pub date: NaiveDate,
}
