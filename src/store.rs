//! The in-memory task store.
//!
//! `TaskStore` owns the working copy of the board. Every mutating operation
//! validates its input first, then changes the working copy and hands back a
//! [`Tentative`] that remembers what the board looked like before. The caller
//! either confirms it once the change has been persisted or rolls it back.
//! Only one change may be outstanding at a time.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::ordering::{self, OrderPlan, Slot};
use crate::task::*;

/// A change applied to the store but not yet confirmed.
#[must_use = "a tentative change must be confirmed or rolled back"]
#[derive(Debug)]
pub struct Tentative<T> {
    seq: u64,
    before: Box<Database>,
    pub value: T,
}

#[derive(Debug)]
pub struct TaskStore {
    db: Database,
    owner: String,
    default_category: Category,
    step: i64,
    seq: u64,
    pending: Option<u64>,
}

impl TaskStore {
    pub fn new(db: Database, config: &Config) -> Self {
        TaskStore {
            db,
            owner: config.owner.clone(),
            default_category: config.default_category,
            step: config.ordering.step,
            seq: 0,
            pending: None,
        }
    }

    /// Current working copy, including any unconfirmed change.
    pub fn snapshot(&self) -> &Database {
        &self.db
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn begin<T>(&mut self, value: T) -> Result<Tentative<T>> {
        if self.pending.is_some() {
            return Err(Error::Validation(
                "A previous change is still being saved; try again".into(),
            ));
        }
        self.seq += 1;
        self.pending = Some(self.seq);
        Ok(Tentative {
            seq: self.seq,
            before: Box::new(self.db.clone()),
            value,
        })
    }

    /// Keep the change and release the store for the next one.
    pub fn confirm<T>(&mut self, t: Tentative<T>) -> T {
        debug_assert_eq!(self.pending, Some(t.seq));
        self.pending = None;
        t.value
    }

    /// Restore the board to how it was before the change.
    pub fn rollback<T>(&mut self, t: Tentative<T>) {
        debug_assert_eq!(self.pending, Some(t.seq));
        debug!(seq = t.seq, "rolling back tentative change");
        self.db = *t.before;
        self.pending = None;
    }

    // ---- queries ----

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.db.get(id)
    }

    fn require(&self, id: u64) -> Result<&Task> {
        self.db.get(id).ok_or_else(|| Error::NotFound(format!("task {id}")))
    }

    pub fn resolve(&self, identifier: &str) -> Result<u64> {
        self.db.resolve(identifier)
    }

    /// Tasks of one category in display order.
    pub fn tasks_in(&self, category: Category) -> Vec<&Task> {
        self.db.in_category(category)
    }

    pub fn attachments_for(&self, task_id: u64) -> Vec<&Attachment> {
        self.db.attachments.iter().filter(|a| a.task_id == task_id).collect()
    }

    pub fn comments_for(&self, task_id: u64) -> Vec<&Comment> {
        self.db.comments.iter().filter(|c| c.task_id == task_id).collect()
    }

    /// Newest first. `None` means the whole board.
    pub fn activity(&self, task_id: Option<u64>) -> Vec<&Activity> {
        let mut entries: Vec<&Activity> = self
            .db
            .activity
            .iter()
            .filter(|a| task_id.map_or(true, |id| a.task_id == id))
            .collect();
        entries.sort_by(|a, b| b.at_utc.cmp(&a.at_utc).then(b.id.cmp(&a.id)));
        entries
    }

    pub fn is_completed_on(&self, task_id: u64, date: NaiveDate) -> bool {
        self.db
            .completions
            .iter()
            .any(|c| c.task_id == task_id && c.date == date)
    }

    // ---- mutations ----

    fn record(&mut self, task_id: u64, kind: ActivityKind, detail: impl Into<String>) {
        let entry = Activity {
            id: self.db.next_activity_id(),
            task_id,
            kind,
            detail: detail.into(),
            owner: self.owner.clone(),
            at_utc: Utc::now().timestamp(),
        };
        self.db.activity.push(entry);
    }

    fn siblings(&self, category: Category, except: Option<u64>) -> Vec<Slot> {
        self.db
            .in_category(category)
            .into_iter()
            .filter(|t| Some(t.id) != except)
            .map(Slot::from)
            .collect()
    }

    fn apply_renumber(&mut self, renumbered: &[(u64, i64)], now: i64) {
        for &(id, order) in renumbered {
            if let Some(t) = self.db.get_mut(id) {
                if t.order != order {
                    t.order = order;
                    t.updated_at_utc = now;
                }
            }
        }
    }

    /// Validate and add a task. Appends to its category unless a position is given.
    pub fn create_task(&mut self, input: NewTask) -> Result<Tentative<u64>> {
        let valid = input.validate(self.default_category)?;
        let id = self.db.next_id();
        let siblings = self.siblings(valid.category, None);
        let index = valid.position.unwrap_or(siblings.len());
        let plan = ordering::plan_insert(&siblings, index, self.step);

        let tentative = self.begin(id)?;
        let now = Utc::now().timestamp();
        if plan.is_renumber() {
            info!(category = %valid.category, "renumbered category to make room");
            self.apply_renumber(&plan.renumbered, now);
        }
        self.db.tasks.push(Task {
            id,
            title: valid.title,
            description: valid.description,
            category: valid.category,
            status: valid.status,
            priority: valid.priority,
            due: valid.due,
            progress: valid.progress,
            order: plan.moved,
            recurrence_weeks: valid.recurrence_weeks,
            owner: self.owner.clone(),
            created_at_utc: now,
            updated_at_utc: now,
        });
        self.record(id, ActivityKind::Created, format!("in {}", valid.category));
        debug!(id, order = plan.moved, "created task");
        Ok(tentative)
    }

    pub fn update_task(&mut self, id: u64, edit: &TaskEdit) -> Result<Tentative<()>> {
        if edit.is_empty() {
            return Err(Error::Validation("Nothing to update".into()));
        }
        let mut next = self.require(id)?.clone();
        let changed = edit.apply_to(&mut next)?;

        let tentative = self.begin(())?;
        next.updated_at_utc = Utc::now().timestamp();
        if let Some(t) = self.db.get_mut(id) {
            *t = next;
        }
        self.record(id, ActivityKind::Updated, changed.join(", "));
        Ok(tentative)
    }

    pub fn set_status(&mut self, id: u64, status: Status) -> Result<Tentative<Status>> {
        let previous = self.require(id)?.status;
        let tentative = self.begin(status)?;
        if let Some(t) = self.db.get_mut(id) {
            t.status = status;
            t.updated_at_utc = Utc::now().timestamp();
        }
        self.record(
            id,
            ActivityKind::StatusChanged,
            format!("{} -> {}", status_name(previous), status_name(status)),
        );
        Ok(tentative)
    }

    /// Checkbox behaviour: open tasks become done, done tasks reopen.
    pub fn toggle_status(&mut self, id: u64) -> Result<Tentative<Status>> {
        let next = self.require(id)?.status.toggled();
        self.set_status(id, next)
    }

    /// Drop a task at `index` within `target`, moving it between categories
    /// if needed. Category, order and recurrence change together.
    pub fn move_task(&mut self, id: u64, target: Category, index: usize) -> Result<Tentative<OrderPlan>> {
        let source = self.require(id)?.category;
        let recurrence = if source == target {
            self.require(id)?.recurrence_weeks
        } else {
            normalise_recurrence(target, None)?
        };
        let siblings = self.siblings(target, Some(id));
        let index = index.min(siblings.len());
        let plan = ordering::plan_insert(&siblings, index, self.step);

        let tentative = self.begin(plan.clone())?;
        let now = Utc::now().timestamp();
        if plan.is_renumber() {
            info!(category = %target, tasks = siblings.len() + 1, "renumbered category to make room");
            self.apply_renumber(&plan.renumbered, now);
        }
        if let Some(t) = self.db.get_mut(id) {
            t.category = target;
            t.order = plan.moved;
            t.recurrence_weeks = recurrence;
            t.updated_at_utc = now;
        }
        if source == target {
            self.record(id, ActivityKind::Reordered, format!("position {index} in {target}"));
        } else {
            self.record(id, ActivityKind::Moved, format!("{source} -> {target} at position {index}"));
        }
        debug!(id, %source, %target, order = plan.moved, "moved task");
        Ok(tentative)
    }

    /// Like [`move_task`](Self::move_task) for a category name from user input.
    pub fn move_task_to(&mut self, id: u64, target: &str, index: usize) -> Result<Tentative<OrderPlan>> {
        let target: Category = target.parse()?;
        self.move_task(id, target, index)
    }

    /// Reassign `0..n` to a category in its current display order.
    pub fn renumber_category(&mut self, category: Category) -> Result<Tentative<Vec<(u64, i64)>>> {
        let orders = ordering::renumber(&self.siblings(category, None));
        let tentative = self.begin(orders.clone())?;
        self.apply_renumber(&orders, Utc::now().timestamp());
        info!(%category, tasks = orders.len(), "renumbered category");
        Ok(tentative)
    }

    /// Hard delete, taking the task's attachments, comments, activity and
    /// completions with it.
    pub fn delete_task(&mut self, id: u64) -> Result<Tentative<Task>> {
        let task = self.require(id)?.clone();
        let tentative = self.begin(task)?;
        self.db.tasks.retain(|t| t.id != id);
        self.db.attachments.retain(|a| a.task_id != id);
        self.db.comments.retain(|c| c.task_id != id);
        self.db.activity.retain(|a| a.task_id != id);
        self.db.completions.retain(|c| c.task_id != id);
        info!(id, "deleted task");
        Ok(tentative)
    }

    /// Link an existing local file to a task.
    pub fn add_attachment(&mut self, task_id: u64, path: &Path) -> Result<Tentative<u64>> {
        self.require(task_id)?;
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(Error::Validation(format!("{} is not a file", path.display())));
        }
        let full = fs::canonicalize(path)?;
        let file_name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| full.display().to_string());

        let id = self.db.next_attachment_id();
        let tentative = self.begin(id)?;
        self.db.attachments.push(Attachment {
            id,
            task_id,
            file_name: file_name.clone(),
            path: full.display().to_string(),
            size_bytes: meta.len(),
            added_at_utc: Utc::now().timestamp(),
        });
        self.record(task_id, ActivityKind::AttachmentAdded, file_name);
        Ok(tentative)
    }

    pub fn remove_attachment(&mut self, attachment_id: u64) -> Result<Tentative<Attachment>> {
        let attachment = self
            .db
            .attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("attachment {attachment_id}")))?;
        let tentative = self.begin(attachment.clone())?;
        self.db.attachments.retain(|a| a.id != attachment_id);
        self.record(attachment.task_id, ActivityKind::AttachmentRemoved, attachment.file_name);
        Ok(tentative)
    }

    pub fn add_comment(&mut self, task_id: u64, body: &str) -> Result<Tentative<u64>> {
        self.require(task_id)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::Validation("Comment cannot be empty".into()));
        }
        let id = self.db.next_comment_id();
        let tentative = self.begin(id)?;
        self.db.comments.push(Comment {
            id,
            task_id,
            body: body.to_string(),
            owner: self.owner.clone(),
            created_at_utc: Utc::now().timestamp(),
        });
        self.record(task_id, ActivityKind::Commented, format!("comment {id}"));
        Ok(tentative)
    }

    /// Tick or untick a weekly recurring task for one day. Returns the new state.
    pub fn toggle_day(&mut self, task_id: u64, date: NaiveDate) -> Result<Tentative<bool>> {
        let task = self.require(task_id)?;
        if !task.category.is_recurring() {
            return Err(Error::Validation(format!(
                "Task {task_id} is not weekly-recurring; mark it done instead"
            )));
        }
        if !task.recurs_on(date) {
            return Err(Error::Validation(format!(
                "Task {task_id} does not recur on {date}"
            )));
        }
        let done = !self.is_completed_on(task_id, date);

        let tentative = self.begin(done)?;
        if done {
            self.db.completions.push(DailyCompletion { task_id, date });
            self.record(task_id, ActivityKind::CompletedDay, date.to_string());
        } else {
            self.db.completions.retain(|c| !(c.task_id == task_id && c.date == date));
            self.record(task_id, ActivityKind::CompletedDay, format!("{date} undone"));
        }
        Ok(tentative)
    }
}

fn status_name(s: Status) -> &'static str {
    match s {
        Status::Todo => "todo",
        Status::InProgress => "in-progress",
        Status::Done => "done",
        Status::Blocked => "blocked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::is_strictly_increasing;
    use chrono::Duration;

    fn store() -> TaskStore {
        TaskStore::new(Database::empty(), &Config::default())
    }

    fn add(store: &mut TaskStore, title: &str, category: Category) -> u64 {
        let mut input = NewTask::titled(title);
        input.category = Some(category);
        let t = store.create_task(input).unwrap();
        store.confirm(t)
    }

    fn ids(store: &TaskStore, category: Category) -> Vec<u64> {
        store.tasks_in(category).iter().map(|t| t.id).collect()
    }

    fn orders(store: &TaskStore, category: Category) -> Vec<i64> {
        store.tasks_in(category).iter().map(|t| t.order).collect()
    }

    fn set_order(store: &mut TaskStore, id: u64, order: i64) {
        store.db.get_mut(id).unwrap().order = order;
    }

    #[test]
    fn empty_title_rejected_before_mutation() {
        let mut s = store();
        add(&mut s, "existing", Category::Work);
        let before = s.snapshot().clone();

        let err = s.create_task(NewTask::titled("   ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(s.snapshot(), &before);
        assert!(!s.has_pending());
    }

    #[test]
    fn appended_tasks_are_strictly_increasing() {
        let mut s = store();
        for i in 0..5 {
            add(&mut s, &format!("w{i}"), Category::Work);
        }
        let o = orders(&s, Category::Work);
        assert_eq!(o[0], 0);
        assert!(o.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(s.tasks_in(Category::Work)[4].title, "w4");
    }

    #[test]
    fn midpoint_move_touches_only_the_moved_task() {
        let mut s = store();
        let a = add(&mut s, "a", Category::Work);
        let b = add(&mut s, "b", Category::Work);
        let c = add(&mut s, "c", Category::Work);
        set_order(&mut s, a, 0);
        set_order(&mut s, b, 10);
        set_order(&mut s, c, 20);
        let n = add(&mut s, "n", Category::LifeAdmin);

        let t = s.move_task(n, Category::Work, 1).unwrap();
        let plan = s.confirm(t);
        assert_eq!(plan.moved, 5);
        assert!(!plan.is_renumber());
        assert_eq!(ids(&s, Category::Work), vec![a, n, b, c]);
        assert_eq!(orders(&s, Category::Work), vec![0, 5, 10, 20]);
    }

    #[test]
    fn adjacent_orders_trigger_renumbering() {
        let mut s = store();
        let a = add(&mut s, "a", Category::Work);
        let b = add(&mut s, "b", Category::Work);
        let c = add(&mut s, "c", Category::Work);
        set_order(&mut s, a, 0);
        set_order(&mut s, b, 1);
        set_order(&mut s, c, 2);

        let mut input = NewTask::titled("squeezed");
        input.category = Some(Category::Work);
        input.position = Some(1);
        let t = s.create_task(input).unwrap();
        let n = s.confirm(t);

        assert_eq!(ids(&s, Category::Work), vec![a, n, b, c]);
        assert_eq!(orders(&s, Category::Work), vec![0, 1, 2, 3]);
    }

    #[test]
    fn move_between_categories_keeps_sibling_order() {
        let mut s = store();
        let w: Vec<u64> = (0..4).map(|i| add(&mut s, &format!("w{i}"), Category::Work)).collect();
        let l: Vec<u64> = (0..3).map(|i| add(&mut s, &format!("l{i}"), Category::LifeAdmin)).collect();

        let t = s.move_task(w[1], Category::LifeAdmin, 2).unwrap();
        s.confirm(t);

        assert_eq!(ids(&s, Category::Work), vec![w[0], w[2], w[3]]);
        assert_eq!(ids(&s, Category::LifeAdmin), vec![l[0], l[1], w[1], l[2]]);
        assert_eq!(s.get(w[1]).unwrap().category, Category::LifeAdmin);
    }

    #[test]
    fn reorder_within_a_category() {
        let mut s = store();
        let t: Vec<u64> = (0..4).map(|i| add(&mut s, &format!("t{i}"), Category::Work)).collect();
        // Drag the first task to the end: index counts siblings without it.
        let m = s.move_task(t[0], Category::Work, 3).unwrap();
        s.confirm(m);
        assert_eq!(ids(&s, Category::Work), vec![t[1], t[2], t[3], t[0]]);
        let m = s.move_task(t[3], Category::Work, 0).unwrap();
        s.confirm(m);
        assert_eq!(ids(&s, Category::Work), vec![t[3], t[1], t[2], t[0]]);
        assert_eq!(s.activity(Some(t[3]))[0].kind, ActivityKind::Reordered);
    }

    #[test]
    fn many_moves_keep_every_category_ordered() {
        let mut s = TaskStore::new(
            Database::empty(),
            &Config {
                ordering: crate::config::OrderingConfig { step: 4 },
                ..Config::default()
            },
        );
        let all: Vec<u64> = (0..12)
            .map(|i| add(&mut s, &format!("t{i}"), Category::ALL[i % 3]))
            .collect();
        for (n, &id) in all.iter().cycle().take(120).enumerate() {
            let target = Category::ALL[(n * 7) % 3];
            let t = s.move_task(id, target, n % 3).unwrap();
            s.confirm(t);
            for c in Category::ALL {
                let slots: Vec<Slot> = s.tasks_in(c).into_iter().map(Slot::from).collect();
                assert!(is_strictly_increasing(&slots), "{c} out of order after move {n}");
            }
        }
        assert_eq!(s.snapshot().tasks.len(), 12);
    }

    #[test]
    fn moving_sets_and_clears_recurrence() {
        let mut s = store();
        let id = add(&mut s, "stretch", Category::Work);
        let t = s.move_task(id, Category::WeeklyRecurring, 0).unwrap();
        s.confirm(t);
        assert_eq!(s.get(id).unwrap().recurrence_weeks, Some(1));
        let t = s.move_task(id, Category::LifeAdmin, 0).unwrap();
        s.confirm(t);
        assert_eq!(s.get(id).unwrap().recurrence_weeks, None);
    }

    #[test]
    fn move_errors() {
        let mut s = store();
        let id = add(&mut s, "x", Category::Work);
        assert!(matches!(s.move_task_to(id, "someday", 0), Err(Error::Validation(_))));
        assert!(matches!(s.move_task(99, Category::Work, 0), Err(Error::NotFound(_))));
        assert!(!s.has_pending());
    }

    #[test]
    fn renumber_produces_contiguous_sequence() {
        let mut s = store();
        let t: Vec<u64> = (0..4).map(|i| add(&mut s, &format!("t{i}"), Category::Work)).collect();
        set_order(&mut s, t[0], -50);
        set_order(&mut s, t[2], 7000);
        let before = ids(&s, Category::Work);
        let r = s.renumber_category(Category::Work).unwrap();
        let out = s.confirm(r);
        assert_eq!(out.len(), 4);
        assert_eq!(orders(&s, Category::Work), vec![0, 1, 2, 3]);
        assert_eq!(ids(&s, Category::Work), before);
    }

    #[test]
    fn rollback_restores_previous_board() {
        let mut s = store();
        let id = add(&mut s, "keep me", Category::Work);
        let before = s.snapshot().clone();

        let t = s.delete_task(id).unwrap();
        assert!(s.get(id).is_none());
        s.rollback(t);
        assert_eq!(s.snapshot(), &before);
        assert!(!s.has_pending());
    }

    #[test]
    fn second_change_waits_for_the_first() {
        let mut s = store();
        let id = add(&mut s, "x", Category::Work);
        let first = s.toggle_status(id).unwrap();
        assert!(s.toggle_status(id).is_err());
        assert_eq!(s.confirm(first), Status::Done);
        let again = s.toggle_status(id).unwrap();
        assert_eq!(s.confirm(again), Status::Todo);
    }

    #[test]
    fn delete_cascades_to_dependents() {
        let mut s = store();
        let keep = add(&mut s, "keep", Category::WeeklyRecurring);
        let gone = add(&mut s, "gone", Category::WeeklyRecurring);
        let file = tempfile::NamedTempFile::new().unwrap();

        for id in [keep, gone] {
            let today = s.get(id).unwrap().created_date();
            let t = s.add_attachment(id, file.path()).unwrap();
            s.confirm(t);
            let t = s.add_comment(id, "note").unwrap();
            s.confirm(t);
            let t = s.toggle_day(id, today).unwrap();
            s.confirm(t);
        }

        let t = s.delete_task(gone).unwrap();
        s.confirm(t);
        let db = s.snapshot();
        assert!(db.attachments.iter().all(|a| a.task_id == keep));
        assert!(db.comments.iter().all(|c| c.task_id == keep));
        assert!(db.activity.iter().all(|a| a.task_id == keep));
        assert!(db.completions.iter().all(|c| c.task_id == keep));
        assert_eq!(db.attachments.len(), 1);
    }

    #[test]
    fn update_validates_and_logs() {
        let mut s = store();
        let id = add(&mut s, "draft", Category::Work);
        let bad = TaskEdit { title: Some(" ".into()), ..TaskEdit::default() };
        assert!(s.update_task(id, &bad).is_err());
        assert!(s.update_task(id, &TaskEdit::default()).is_err());

        let edit = TaskEdit {
            title: Some("final".into()),
            priority: Some(Priority::Urgent),
            ..TaskEdit::default()
        };
        let t = s.update_task(id, &edit).unwrap();
        s.confirm(t);
        let task = s.get(id).unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.priority, Priority::Urgent);
        let latest = s.activity(Some(id))[0];
        assert_eq!(latest.kind, ActivityKind::Updated);
        assert_eq!(latest.detail, "title, priority");
    }

    #[test]
    fn daily_completion_rules() {
        let mut s = store();
        let work = add(&mut s, "report", Category::Work);
        let gym = add(&mut s, "gym", Category::WeeklyRecurring);
        let start = s.get(gym).unwrap().created_date();

        assert!(s.toggle_day(work, start).is_err());
        assert!(s.toggle_day(gym, start + Duration::days(7)).is_err());

        let t = s.toggle_day(gym, start).unwrap();
        assert!(s.confirm(t));
        assert!(s.is_completed_on(gym, start));
        let t = s.toggle_day(gym, start).unwrap();
        assert!(!s.confirm(t));
        assert!(!s.is_completed_on(gym, start));
    }

    #[test]
    fn new_weekly_task_can_be_ticked_off_today() {
        let mut s = store();
        let gym = add(&mut s, "gym", Category::WeeklyRecurring);
        let today = crate::db::today();
        assert_eq!(s.get(gym).unwrap().created_date(), today);
        let t = s.toggle_day(gym, today).unwrap();
        assert!(s.confirm(t));
    }

    #[test]
    fn oversized_recurrence_is_refused_not_fatal() {
        let mut s = store();
        let mut input = NewTask::titled("forever");
        input.category = Some(Category::WeeklyRecurring);
        input.recurrence_weeks = Some(u32::MAX);
        assert!(matches!(s.create_task(input), Err(Error::Validation(_))));
        assert!(!s.has_pending());

        // A snapshot edited by hand can still carry one.
        let gym = add(&mut s, "gym", Category::WeeklyRecurring);
        s.db.get_mut(gym).unwrap().recurrence_weeks = Some(u32::MAX);
        let start = s.get(gym).unwrap().created_date();
        assert!(matches!(s.toggle_day(gym, start), Err(Error::Validation(_))));
    }

    #[test]
    fn attachments_require_a_real_file() {
        let mut s = store();
        let id = add(&mut s, "taxes", Category::LifeAdmin);
        let dir = tempfile::tempdir().unwrap();
        assert!(s.add_attachment(id, dir.path()).is_err());
        assert!(s.add_attachment(id, &dir.path().join("missing.pdf")).is_err());

        let path = dir.path().join("receipt.pdf");
        std::fs::write(&path, b"12345").unwrap();
        let t = s.add_attachment(id, &path).unwrap();
        let aid = s.confirm(t);
        let att = &s.attachments_for(id)[0];
        assert_eq!(att.file_name, "receipt.pdf");
        assert_eq!(att.size_bytes, 5);

        let t = s.remove_attachment(aid).unwrap();
        s.confirm(t);
        assert!(s.attachments_for(id).is_empty());
        assert!(matches!(s.remove_attachment(aid), Err(Error::NotFound(_))));
    }

    #[test]
    fn blank_comment_rejected() {
        let mut s = store();
        let id = add(&mut s, "x", Category::Work);
        assert!(s.add_comment(id, "  ").is_err());
        assert!(s.add_comment(42, "hi").is_err());
        let t = s.add_comment(id, "  looks good ").unwrap();
        s.confirm(t);
        assert_eq!(s.comments_for(id)[0].body, "looks good");
    }
}
