//! Enumerations and field types for tasks.
//!
//! This module defines the fixed vocabularies a task is described with: the
//! category it lives in, its status and priority, plus the sort and filter
//! options used by the list command.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The three fixed groupings a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    LifeAdmin,
    Work,
    WeeklyRecurring,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::LifeAdmin, Category::Work, Category::WeeklyRecurring];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::LifeAdmin => "life-admin",
            Category::Work => "work",
            Category::WeeklyRecurring => "weekly-recurring",
        }
    }

    pub fn is_recurring(self) -> bool {
        self == Category::WeeklyRecurring
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['_', ' '], "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == norm)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown category '{}'. Expected one of: life-admin, work, weekly-recurring",
                    s.trim()
                ))
            })
    }
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl Status {
    /// Status a checkbox click moves to: anything open becomes done, done reopens.
    pub fn toggled(self) -> Status {
        match self {
            Status::Done => Status::Todo,
            Status::Todo | Status::InProgress | Status::Blocked => Status::Done,
        }
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort rank, most pressing first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// What happened to a task, as recorded in the activity trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Created,
    Updated,
    StatusChanged,
    Moved,
    Reordered,
    AttachmentAdded,
    AttachmentRemoved,
    Commented,
    CompletedDay,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    /// Manual board order within each category.
    Board,
    Due,
    Priority,
    Id,
}

/// Filtering options for tasks based on due dates.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DueFilter {
    Today,
    ThisWeek,
    Overdue,
    None,
}
