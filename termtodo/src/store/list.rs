//! Ordered in-memory mirror of the signed-in user's tasks.

use termtodo_api::task::{TaskId, TaskRecord};

use super::Filter;

/// The task mirror backing the board, newest first.
///
/// Order is whatever the service last confirmed: a full reload adopts the
/// server's ordering wholesale, and a confirmed add goes to the front. The
/// mirror holds plain [`TaskRecord`] rows; it never re-sorts or invents
/// entries on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<TaskRecord>,
}

impl TaskList {
    /// Creates an empty mirror.
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Replaces the whole mirror with a freshly loaded snapshot.
    pub fn reset(&mut self, tasks: Vec<TaskRecord>) {
        self.tasks = tasks;
    }

    /// Drops every row. Used on load failure and on sign-out.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Inserts a confirmed new task at the front of the list.
    pub fn prepend(&mut self, task: TaskRecord) {
        self.tasks.insert(0, task);
    }

    /// Overwrites the row with the same ID, keeping its position.
    ///
    /// Returns `false` if no row carries that ID (e.g. it was deleted from
    /// another device between the read and the confirmation).
    pub fn replace(&mut self, task: TaskRecord) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Removes the row with the given ID.
    ///
    /// Returns `false` if the ID was not present; no other row is touched
    /// either way.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() < before
    }

    /// Removes every row whose ID appears in `ids`, returning how many
    /// rows went away.
    pub fn remove_many(&mut self, ids: &[TaskId]) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !ids.contains(&t.id));
        before - self.tasks.len()
    }

    /// Looks up a row by ID.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Iterates over every row in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskRecord> {
        self.tasks.iter()
    }

    /// Rows visible under the given filter, in display order.
    #[must_use]
    pub fn visible(&self, filter: Filter) -> Vec<&TaskRecord> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t.completed))
            .collect()
    }

    /// Total row count, ignoring the filter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the mirror holds no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks not yet completed.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Number of completed tasks.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Whether at least one task is completed.
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|t| t.completed)
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a TaskRecord;
    type IntoIter = std::slice::Iter<'a, TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
