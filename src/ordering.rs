//! Order values for tasks within a category.
//!
//! Tasks carry a sparse integer `order`. Dropping a task between two
//! neighbours gives it the midpoint of their orders, so a move touches one
//! row. Only when two neighbours are adjacent integers is the whole category
//! renumbered `0, 1, 2, ...`, with the moved task already in its new slot.

use crate::task::Task;

/// Gap left between consecutive tasks when appending or prepending.
pub const DEFAULT_STEP: i64 = 1024;

/// The sort key of one sibling in the destination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: u64,
    pub order: i64,
}

impl From<&Task> for Slot {
    fn from(t: &Task) -> Self {
        Slot { id: t.id, order: t.order }
    }
}

/// New order values produced by an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// Order for the moved task.
    pub moved: i64,
    /// New orders for every sibling; empty unless the category was renumbered.
    pub renumbered: Vec<(u64, i64)>,
}

impl OrderPlan {
    pub fn is_renumber(&self) -> bool {
        !self.renumbered.is_empty()
    }
}

/// Midpoint strictly between `lo` and `hi`, if one exists.
pub fn midpoint(lo: i64, hi: i64) -> Option<i64> {
    let gap = hi.checked_sub(lo)?;
    if gap < 2 {
        return None;
    }
    Some(lo + gap / 2)
}

/// Work out the order for a task dropped at `index` among `siblings`.
///
/// `siblings` are the destination category's tasks in display order with the
/// moved task left out. `index` is clamped to `0..=siblings.len()`.
pub fn plan_insert(siblings: &[Slot], index: usize, step: i64) -> OrderPlan {
    let index = index.min(siblings.len());

    let candidate = match (index.checked_sub(1).map(|i| siblings[i]), siblings.get(index)) {
        (None, None) => Some(0),
        (Some(lo), None) => lo.order.checked_add(step),
        (None, Some(hi)) => hi.order.checked_sub(step),
        (Some(lo), Some(hi)) => midpoint(lo.order, hi.order),
    };

    match candidate {
        Some(moved) => OrderPlan {
            moved,
            renumbered: Vec::new(),
        },
        None => renumber_with_insert(siblings, index),
    }
}

fn renumber_with_insert(siblings: &[Slot], index: usize) -> OrderPlan {
    let renumbered = siblings
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let pos = if i < index { i } else { i + 1 };
            (s.id, pos as i64)
        })
        .collect();
    OrderPlan {
        moved: index as i64,
        renumbered,
    }
}

/// Sequential orders `0..n` for `siblings` in their current order.
pub fn renumber(siblings: &[Slot]) -> Vec<(u64, i64)> {
    siblings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id, i as i64))
        .collect()
}

/// True if orders are strictly increasing, which is what display order needs.
pub fn is_strictly_increasing(slots: &[Slot]) -> bool {
    slots.windows(2).all(|w| w[0].order < w[1].order)
}
