//! Command implementations for the CLI interface.
//!
//! Each handler resolves its arguments against the open [`Session`], runs a
//! single store operation through [`Session::commit`] and prints the result
//! either as a table or as JSON.

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use serde_json::json;

use crate::cli::Cli;
use crate::db::*;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::sync::{Remote, Session};
use crate::task::{NewTask, Task, TaskEdit};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Category: life-admin | work | weekly-recurring.
        #[arg(long, short, value_enum)]
        category: Option<Category>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high | urgent.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Status: todo | in-progress | done | blocked.
        #[arg(long, value_enum, default_value_t = Status::Todo)]
        status: Status,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "friday" or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Progress target, e.g. 5 for "read 5 chapters".
        #[arg(long)]
        target: Option<u32>,
        /// Weeks a weekly-recurring task repeats for.
        #[arg(long)]
        weeks: Option<u32>,
        /// Insert at this position in the category (0 = top). Defaults to the end.
        #[arg(long)]
        at: Option<usize>,
    },

    /// List tasks with optional filters.
    List {
        /// Only this category.
        #[arg(long, short, value_enum)]
        category: Option<Category>,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Due filter: today | this-week | overdue | none.
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Board)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID or title.
    View {
        /// Task ID or title.
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New description; pass "" to clear.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        /// Progress target.
        #[arg(long)]
        target: Option<u32>,
        /// Progress so far.
        #[arg(long)]
        current: Option<u32>,
        #[arg(long)]
        clear_progress: bool,
        /// Recurrence length in weeks (weekly-recurring only).
        #[arg(long)]
        weeks: Option<u32>,
    },

    /// Set a task's status.
    Status {
        /// Task ID or title.
        id: String,
        #[arg(value_enum)]
        status: Status,
    },

    /// Tick a task off, or reopen it if it is already done.
    Toggle {
        /// Task ID or title.
        id: String,
    },

    /// Move a task to a position, optionally in another category.
    Move {
        /// Task ID or title.
        id: String,
        /// Destination category. Defaults to the task's current one.
        #[arg(long)]
        to: Option<String>,
        /// Position in the destination (0 = top). Defaults to the end.
        #[arg(long)]
        at: Option<usize>,
    },

    /// Reset a category's order values to 0, 1, 2, ...
    Renumber {
        /// Category to renumber.
        category: String,
    },

    /// Delete a task and everything attached to it.
    Delete {
        /// Task ID or title.
        id: String,
    },

    /// Attach a local file to a task.
    Attach {
        /// Task ID or title.
        id: String,
        /// File to attach.
        path: PathBuf,
    },

    /// Remove an attachment by its ID.
    Detach {
        attachment_id: u64,
    },

    /// Comment on a task.
    Comment {
        /// Task ID or title.
        id: String,
        /// Comment text.
        text: String,
    },

    /// Show recent activity for one task or the whole board.
    Activity {
        /// Task ID or title.
        id: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Tick (or untick) a weekly-recurring task for a day.
    DoneDay {
        /// Task ID or title.
        id: String,
        /// Day to mark; defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show this week's recurring tasks and which days are done.
    Week {
        /// Any day in the week to show; defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match input {
        None => Ok(today),
        Some(s) => parse_due_input(s, today).ok_or_else(|| {
            Error::Validation(format!(
                "Unrecognised date '{s}'. Use YYYY-MM-DD, 'today', 'tomorrow', a weekday or 'in Nd'."
            ))
        }),
    }
}

fn format_utc(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Dispatch a parsed command line against an open session.
pub fn run<R: Remote>(session: &mut Session<R>, command: Commands, json: bool) -> Result<()> {
    let today = today();
    match command {
        Commands::Add { title, category, desc, priority, status, due, target, weeks, at } => {
            let due = due.map(|d| parse_date(Some(&d), today)).transpose()?;
            let input = NewTask {
                title,
                description: desc,
                category,
                status,
                priority,
                due,
                progress_target: target,
                recurrence_weeks: weeks,
                position: at,
            };
            cmd_add(session, input, json)
        }
        Commands::List { category, all, status, due, sort, limit } => {
            cmd_list(session, category, all, status, due, sort, limit, today, json)
        }
        Commands::View { id } => cmd_view(session, &id, today, json),
        Commands::Update {
            id, title, desc, priority, due, clear_due, target, current, clear_progress, weeks,
        } => {
            let due = due.map(|d| parse_date(Some(&d), today)).transpose()?;
            let edit = TaskEdit {
                title,
                description: desc,
                priority,
                due,
                clear_due,
                progress_target: target,
                progress_current: current,
                clear_progress,
                recurrence_weeks: weeks,
            };
            cmd_update(session, &id, &edit, json)
        }
        Commands::Status { id, status } => cmd_status(session, &id, Some(status), json),
        Commands::Toggle { id } => cmd_status(session, &id, None, json),
        Commands::Move { id, to, at } => cmd_move(session, &id, to.as_deref(), at, json),
        Commands::Renumber { category } => cmd_renumber(session, &category, json),
        Commands::Delete { id } => cmd_delete(session, &id, json),
        Commands::Attach { id, path } => cmd_attach(session, &id, &path, json),
        Commands::Detach { attachment_id } => cmd_detach(session, attachment_id, json),
        Commands::Comment { id, text } => cmd_comment(session, &id, &text, json),
        Commands::Activity { id, limit } => cmd_activity(session, id.as_deref(), limit, json),
        Commands::DoneDay { id, date } => {
            let date = parse_date(date.as_deref(), today)?;
            cmd_done_day(session, &id, date, json)
        }
        Commands::Week { date } => {
            let date = parse_date(date.as_deref(), today)?;
            cmd_week(session, date, json)
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

pub fn cmd_add<R: Remote>(session: &mut Session<R>, input: NewTask, json: bool) -> Result<()> {
    let id = session.commit(|s| s.create_task(input))?;
    if json {
        return print_json(&session.store().get(id));
    }
    if let Some(t) = session.store().get(id) {
        println!("Added task {} to {}", id, format_category(t.category));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_list<R: Remote>(
    session: &Session<R>,
    category: Option<Category>,
    all: bool,
    status: Option<Status>,
    due: Option<DueFilter>,
    sort: SortKey,
    limit: Option<usize>,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let (week_start, week_end) = start_end_of_this_week(today);
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    let mut filtered: Vec<&Task> = categories
        .into_iter()
        .flat_map(|c| session.store().tasks_in(c))
        .filter(|t| {
            if let Some(s) = status {
                if t.status != s {
                    return false;
                }
            } else if !all && t.status == Status::Done {
                return false;
            }
            match due {
                None => true,
                Some(DueFilter::Today) => t.due == Some(today),
                Some(DueFilter::ThisWeek) => t.due.is_some_and(|d| d >= week_start && d <= week_end),
                Some(DueFilter::Overdue) => t.due.is_some_and(|d| d < today),
                Some(DueFilter::None) => t.due.is_none(),
            }
        })
        .collect();

    match sort {
        SortKey::Board => {}
        SortKey::Due => filtered.sort_by_key(|t| (t.due.unwrap_or(NaiveDate::MAX), t.id)),
        SortKey::Priority => filtered.sort_by_key(|t| (t.priority.rank(), t.due.unwrap_or(NaiveDate::MAX), t.id)),
        SortKey::Id => filtered.sort_by_key(|t| t.id),
    }

    if let Some(n) = limit {
        filtered.truncate(n);
    }

    if json {
        return print_json(&filtered);
    }
    if filtered.is_empty() {
        println!("No tasks.");
    } else {
        print_table(&filtered, today);
    }
    Ok(())
}

pub fn cmd_view<R: Remote>(session: &Session<R>, id: &str, today: NaiveDate, json: bool) -> Result<()> {
    let store = session.store();
    let task_id = store.resolve(id)?;
    let task = store
        .get(task_id)
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    let attachments = store.attachments_for(task_id);
    let comments = store.comments_for(task_id);
    let activity = store.activity(Some(task_id));

    if json {
        return print_json(&json!({
            "task": task,
            "attachments": attachments,
            "comments": comments,
            "activity": activity,
        }));
    }

    let position = store
        .tasks_in(task.category)
        .iter()
        .position(|t| t.id == task_id)
        .unwrap_or_default();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Category:     {} (position {})", format_category(task.category), position);
    println!("Status:       {}", format_status(task.status));
    println!("Priority:     {}", format_priority(task.priority));
    println!(
        "Due:          {}",
        match task.due {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    if let Some(p) = task.progress {
        let note = if p.is_complete() { " (complete)" } else { "" };
        println!("Progress:     {}/{}{}", p.current, p.target, note);
    }
    if let Some(w) = task.recurrence_weeks {
        let (start, end) = task.recurrence_window().unwrap_or((today, today));
        println!("Repeats:      {w} week(s), {start} to {}", end - Duration::days(1));
    }
    println!("Owner:        {}", task.owner);
    println!("Created UTC:  {}", format_utc(task.created_at_utc));
    println!("Updated UTC:  {}", format_utc(task.updated_at_utc));
    println!("Description:\n{}\n", task.description.as_deref().unwrap_or("-"));

    if !attachments.is_empty() {
        println!("Attachments:");
        for a in &attachments {
            println!("  [{}] {} ({} bytes) {}", a.id, a.file_name, a.size_bytes, a.path);
        }
    }
    if !comments.is_empty() {
        println!("Comments:");
        for c in &comments {
            println!("  {} {}: {}", format_utc(c.created_at_utc), c.owner, c.body);
        }
    }
    if !activity.is_empty() {
        println!("Recent activity:");
        for a in activity.iter().take(5) {
            println!("  {} {:?} {}", format_utc(a.at_utc), a.kind, a.detail);
        }
    }
    Ok(())
}

pub fn cmd_update<R: Remote>(session: &mut Session<R>, id: &str, edit: &TaskEdit, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    session.commit(|s| s.update_task(task_id, edit))?;
    if json {
        return print_json(&session.store().get(task_id));
    }
    println!("Updated task {task_id}");
    Ok(())
}

/// Set a status, or toggle it when `status` is `None`.
pub fn cmd_status<R: Remote>(session: &mut Session<R>, id: &str, status: Option<Status>, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let now = match status {
        Some(st) => session.commit(|s| s.set_status(task_id, st))?,
        None => session.commit(|s| s.toggle_status(task_id))?,
    };
    if json {
        return print_json(&json!({ "id": task_id, "status": now }));
    }
    println!("Task {} is now {}", task_id, format_status(now));
    Ok(())
}

pub fn cmd_move<R: Remote>(
    session: &mut Session<R>,
    id: &str,
    to: Option<&str>,
    at: Option<usize>,
    json: bool,
) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let index = at.unwrap_or(usize::MAX);
    let plan = match to {
        Some(category) => session.commit(|s| s.move_task_to(task_id, category, index))?,
        None => {
            let current = session
                .store()
                .get(task_id)
                .map(|t| t.category)
                .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
            session.commit(|s| s.move_task(task_id, current, index))?
        }
    };
    let category = session.store().get(task_id).map(|t| t.category);
    if json {
        return print_json(&json!({
            "id": task_id,
            "category": category,
            "order": plan.moved,
            "renumbered": plan.renumbered.len(),
        }));
    }
    if let Some(c) = category {
        println!("Moved task {} in {}", task_id, format_category(c));
    }
    if plan.is_renumber() {
        println!("Renumbered {} other task(s) to make room", plan.renumbered.len());
    }
    Ok(())
}

pub fn cmd_renumber<R: Remote>(session: &mut Session<R>, category: &str, json: bool) -> Result<()> {
    let category: Category = category.parse()?;
    let orders = session.commit(|s| s.renumber_category(category))?;
    if json {
        return print_json(&json!({ "category": category, "tasks": orders.len() }));
    }
    println!("Renumbered {} task(s) in {}", orders.len(), format_category(category));
    Ok(())
}

pub fn cmd_delete<R: Remote>(session: &mut Session<R>, id: &str, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let removed = session.commit(|s| s.delete_task(task_id))?;
    if json {
        return print_json(&removed);
    }
    println!("Deleted task {} ({})", removed.id, removed.title);
    Ok(())
}

pub fn cmd_attach<R: Remote>(session: &mut Session<R>, id: &str, path: &std::path::Path, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let attachment_id = session.commit(|s| s.add_attachment(task_id, path))?;
    if json {
        return print_json(&json!({ "id": attachment_id, "task_id": task_id }));
    }
    println!("Attached {} to task {} as attachment {}", path.display(), task_id, attachment_id);
    Ok(())
}

pub fn cmd_detach<R: Remote>(session: &mut Session<R>, attachment_id: u64, json: bool) -> Result<()> {
    let removed = session.commit(|s| s.remove_attachment(attachment_id))?;
    if json {
        return print_json(&removed);
    }
    println!("Removed {} from task {}", removed.file_name, removed.task_id);
    Ok(())
}

pub fn cmd_comment<R: Remote>(session: &mut Session<R>, id: &str, text: &str, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let comment_id = session.commit(|s| s.add_comment(task_id, text))?;
    if json {
        return print_json(&json!({ "id": comment_id, "task_id": task_id }));
    }
    println!("Added comment {comment_id} to task {task_id}");
    Ok(())
}

pub fn cmd_activity<R: Remote>(session: &Session<R>, id: Option<&str>, limit: usize, json: bool) -> Result<()> {
    let store = session.store();
    let task_id = id.map(|i| store.resolve(i)).transpose()?;
    let entries: Vec<_> = store.activity(task_id).into_iter().take(limit).collect();
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No activity.");
    }
    for a in entries {
        let title = store.get(a.task_id).map(|t| t.title.as_str()).unwrap_or("-");
        println!(
            "{}  #{:<4} {:<18} {}  {}",
            format_utc(a.at_utc),
            a.task_id,
            format!("{:?}", a.kind),
            truncate(title, 30),
            a.detail
        );
    }
    Ok(())
}

pub fn cmd_done_day<R: Remote>(session: &mut Session<R>, id: &str, date: NaiveDate, json: bool) -> Result<()> {
    let task_id = session.store().resolve(id)?;
    let done = session.commit(|s| s.toggle_day(task_id, date))?;
    if json {
        return print_json(&json!({ "id": task_id, "date": date, "done": done }));
    }
    if done {
        println!("Task {task_id} done for {date}");
    } else {
        println!("Task {task_id} no longer done for {date}");
    }
    Ok(())
}

#[derive(Serialize)]
struct WeekRow<'a> {
    task: &'a Task,
    days: Vec<Option<bool>>,
}

pub fn cmd_week<R: Remote>(session: &Session<R>, date: NaiveDate, json: bool) -> Result<()> {
    let store = session.store();
    let (start, _) = start_end_of_this_week(date);
    let days: Vec<NaiveDate> = (0..7).map(|i| start + Duration::days(i)).collect();

    // `None` marks days outside the task's recurrence window.
    let rows: Vec<WeekRow> = store
        .tasks_in(Category::WeeklyRecurring)
        .into_iter()
        .filter(|t| days.iter().any(|d| t.recurs_on(*d)))
        .map(|t| WeekRow {
            task: t,
            days: days
                .iter()
                .map(|d| t.recurs_on(*d).then(|| store.is_completed_on(t.id, *d)))
                .collect(),
        })
        .collect();

    if json {
        return print_json(&json!({ "week_start": start, "rows": rows }));
    }
    println!("Week of {start}");
    println!("{:<5} {:<30} Mo Tu We Th Fr Sa Su", "ID", "Task");
    for row in &rows {
        let marks: Vec<&str> = row
            .days
            .iter()
            .map(|d| match d {
                Some(true) => "x ",
                Some(false) => ". ",
                None => "  ",
            })
            .collect();
        println!("{:<5} {:<30} {}", row.task.id, truncate(&row.task.title, 30), marks.join(" "));
    }
    if rows.is_empty() {
        println!("No weekly tasks this week.");
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sync::JsonFileRemote;

    fn open(dir: &tempfile::TempDir) -> Session<JsonFileRemote> {
        let remote = JsonFileRemote::new(dir.path().join("tasks.json"));
        Session::open(remote, &Config::default()).unwrap()
    }

    fn add(session: &mut Session<JsonFileRemote>, title: &str, category: Category) {
        let command = Commands::Add {
            title: title.into(),
            category: Some(category),
            desc: None,
            priority: Priority::Medium,
            status: Status::Todo,
            due: None,
            target: None,
            weeks: None,
            at: None,
        };
        run(session, command, false).unwrap();
    }

    fn titles(session: &Session<JsonFileRemote>, category: Category) -> Vec<String> {
        session.store().tasks_in(category).iter().map(|t| t.title.clone()).collect()
    }

    fn move_cmd(id: &str, to: Option<&str>, at: Option<usize>) -> Commands {
        Commands::Move {
            id: id.into(),
            to: to.map(String::from),
            at,
        }
    }

    #[test]
    fn move_without_position_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open(&dir);
        for t in ["a", "b", "c"] {
            add(&mut session, t, Category::Work);
        }
        add(&mut session, "rent", Category::LifeAdmin);

        run(&mut session, move_cmd("a", None, None), false).unwrap();
        assert_eq!(titles(&session, Category::Work), ["b", "c", "a"]);
        assert_eq!(session.store().activity(None)[0].detail, "position 2 in work");

        run(&mut session, move_cmd("b", Some("life_admin"), None), false).unwrap();
        assert_eq!(titles(&session, Category::LifeAdmin), ["rent", "b"]);

        run(&mut session, move_cmd("a", None, Some(0)), false).unwrap();
        assert_eq!(titles(&session, Category::Work), ["a", "c"]);

        let reopened = open(&dir);
        assert_eq!(titles(&reopened, Category::Work), ["a", "c"]);
        assert_eq!(titles(&reopened, Category::LifeAdmin), ["rent", "b"]);
    }

    #[test]
    fn move_to_unknown_category_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open(&dir);
        add(&mut session, "a", Category::Work);
        let before = session.store().snapshot().clone();

        let err = run(&mut session, move_cmd("a", Some("someday"), None), false).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.exit_code(), crate::error::exit_codes::USER_ERROR);
        assert_eq!(session.store().snapshot(), &before);

        let err = run(&mut session, move_cmd("nope", Some("work"), None), false).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn renumber_parses_its_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open(&dir);
        for t in ["a", "b", "c"] {
            add(&mut session, t, Category::Work);
        }

        let bogus = Commands::Renumber { category: "bogus".into() };
        assert!(matches!(run(&mut session, bogus, false), Err(Error::Validation(_))));

        let work = Commands::Renumber { category: "Work".into() };
        run(&mut session, work, true).unwrap();
        let orders: Vec<i64> = open(&dir)
            .store()
            .tasks_in(Category::Work)
            .iter()
            .map(|t| t.order)
            .collect();
        assert_eq!(orders, [0, 1, 2]);
        assert_eq!(titles(&session, Category::Work), ["a", "b", "c"]);
    }

    #[test]
    fn dates_off_the_calendar_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open(&dir);
        add(&mut session, "gym", Category::WeeklyRecurring);

        let done = Commands::DoneDay {
            id: "gym".into(),
            date: Some("in 99999999999d".into()),
        };
        assert!(matches!(run(&mut session, done, false), Err(Error::Validation(_))));

        let week = Commands::Week { date: Some("in 99999999999w".into()) };
        assert!(matches!(run(&mut session, week, false), Err(Error::Validation(_))));
        assert!(session.store().activity(None).iter().all(|a| a.kind != ActivityKind::CompletedDay));
    }
}
