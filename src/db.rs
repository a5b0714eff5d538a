//! Persisted snapshot of the board and assorted formatting helpers.
//!
//! `Database` is the serialisable state of everything a user owns: tasks
//! and their attachments, comments, activity entries and daily completions.
//! It knows how to read and write itself as JSON and how to bring an older
//! snapshot up to the current schema. The free functions at the bottom parse
//! and format the values shown by the CLI.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fields::*;
use crate::task::{Activity, Attachment, Comment, DailyCompletion, Task};

/// Schema written by this build.
///
/// - 0: tasks had no `order` field.
/// - 1: per-category order values.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Database {
    #[serde(default)]
    pub schema_version: u32,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub activity: Vec<Activity>,
    #[serde(default)]
    pub completions: Vec<DailyCompletion>,
}

impl Database {
    /// An empty board at the current schema.
    pub fn empty() -> Self {
        Database {
            schema_version: SCHEMA_VERSION,
            ..Database::default()
        }
    }

    /// Load from a JSON file. A missing file is an empty board.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Database::empty());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let mut db: Database = serde_json::from_str(&buf)?;
        db.migrate()?;
        Ok(db)
    }

    /// Save to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Bring an older snapshot up to `SCHEMA_VERSION`.
    ///
    /// Fields added since a snapshot was written come in through serde
    /// defaults; this handles the changes that need data rewritten.
    pub fn migrate(&mut self) -> Result<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(Error::InvalidConfig(format!(
                "task data was written by a newer version (schema {}, this build understands {})",
                self.schema_version, SCHEMA_VERSION
            )));
        }
        if self.schema_version < 1 {
            self.backfill_order();
            for t in &mut self.tasks {
                if t.category.is_recurring() && t.recurrence_weeks.is_none() {
                    t.recurrence_weeks = Some(1);
                } else if !t.category.is_recurring() {
                    t.recurrence_weeks = None;
                }
            }
            info!(tasks = self.tasks.len(), "migrated snapshot to schema 1");
        }
        self.schema_version = SCHEMA_VERSION;
        Ok(())
    }

    /// Number each category `0..n` by creation time.
    fn backfill_order(&mut self) {
        for category in Category::ALL {
            let mut ids: Vec<(i64, u64)> = self
                .tasks
                .iter()
                .filter(|t| t.category == category)
                .map(|t| (t.created_at_utc, t.id))
                .collect();
            ids.sort_unstable();
            for (pos, (_, id)) in ids.into_iter().enumerate() {
                if let Some(t) = self.get_mut(id) {
                    t.order = pos as i64;
                }
            }
        }
    }

    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_attachment_id(&self) -> u64 {
        self.attachments.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    pub fn next_comment_id(&self) -> u64 {
        self.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn next_activity_id(&self) -> u64 {
        self.activity.iter().map(|a| a.id).max().unwrap_or(0) + 1
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks of one category in display order.
    pub fn in_category(&self, category: Category) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.category == category).collect();
        tasks.sort_by_key(|t| t.display_key());
        tasks
    }

    /// Resolve a task identifier (either ID or title) to a task ID.
    /// Titles match case-insensitively; more than one match is an error.
    pub fn resolve(&self, identifier: &str) -> Result<u64> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<u64>() {
            return match self.get(id) {
                Some(_) => Ok(id),
                None => Err(Error::NotFound(format!("task {id}"))),
            };
        }

        let wanted = identifier.to_lowercase();
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == wanted)
            .collect();

        match matches.len() {
            0 => Err(Error::NotFound(format!("a task named '{identifier}'"))),
            1 => Ok(matches[0].id),
            _ => {
                let mut msg = format!("Multiple tasks are named '{identifier}':\n");
                for t in matches {
                    msg.push_str(&format!("  ID {}: {} ({})\n", t.id, t.title, t.category));
                }
                msg.push_str("Please use the specific ID instead.");
                Err(Error::Ambiguous(msg))
            }
        }
    }
}

/// Parse human-readable due date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next monday", "this friday" and three-letter forms
/// - "end of week", "end of month"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        "end of week" | "eow" => return Some(start_end_of_this_week(today).1),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        // Offsets past the end of the calendar are unrecognised rather than fatal.
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Duration::try_days(n).and_then(|d| today.checked_add_signed(d));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Duration::try_weeks(n).and_then(|d| today.checked_add_signed(d));
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return today.checked_add_signed(Duration::days(ahead));
        }
        if s == format!("next {name}") {
            let days = if ahead == 0 { 7 } else { ahead + 7 };
            return today.checked_add_signed(Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Calculate the start and end dates of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

pub fn format_category(c: Category) -> &'static str {
    match c {
        Category::LifeAdmin => "Life Admin",
        Category::Work => "Work",
        Category::WeeklyRecurring => "Weekly",
    }
}

pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "Todo",
        Status::InProgress => "InProgress",
        Status::Done => "Done",
        Status::Blocked => "Blocked",
    }
}

pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Urgent => "Urgent",
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<5} {:<11} {:<11} {:<7} {:<10} {:<8} {}",
        "ID", "Category", "Status", "Pri", "Due", "Progress", "Title"
    );
    for t in tasks {
        let progress = t
            .progress
            .map(|p| format!("{}/{}", p.current, p.target))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<11} {:<11} {:<7} {:<10} {:<8} {}",
            t.id,
            format_category(t.category),
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due, today),
            progress,
            truncate(&t.title, 60),
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
