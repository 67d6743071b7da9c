//! Task list filters — explicit predicates composed into a query.
//!
//! Each bucket view builds a `TaskQuery` and hands it to the store,
//! which renders it to SQL. Results always come back in name order.

use chrono::NaiveDate;
use uuid::Uuid;

use super::model::Priority;

/// Composable filter over the task table.
///
/// All set predicates are ANDed together. An empty query matches
/// every task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    /// Only tasks in this priority bucket.
    pub priority: Option<Priority>,
    /// Only tasks due exactly on this date.
    pub due_on: Option<NaiveDate>,
    /// Only tasks whose assignee set contains this worker.
    pub assignee: Option<Uuid>,
    /// Only tasks whose name contains this substring (case-insensitive).
    pub name_contains: Option<String>,
}

impl TaskQuery {
    /// Match every task (the open index view).
    pub fn all() -> Self {
        Self::default()
    }

    /// Priority bucket view: tasks in `priority` assigned to `worker`.
    pub fn bucket(priority: Priority, worker: Uuid) -> Self {
        Self {
            priority: Some(priority),
            assignee: Some(worker),
            ..Self::default()
        }
    }

    /// Deadline view: tasks due on `date` assigned to `worker`.
    pub fn due_on(date: NaiveDate, worker: Uuid) -> Self {
        Self {
            due_on: Some(date),
            assignee: Some(worker),
            ..Self::default()
        }
    }

    /// "Mine" view: every task assigned to `worker`.
    pub fn assigned_to(worker: Uuid) -> Self {
        Self {
            assignee: Some(worker),
            ..Self::default()
        }
    }

    /// Add the optional `name` substring filter from a query parameter.
    ///
    /// A missing or all-whitespace value leaves the query unchanged;
    /// the filter only applies when the parameter is present and
    /// non-empty.
    pub fn with_name_filter(mut self, name: Option<&str>) -> Self {
        self.name_contains = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self
    }

    /// True if no predicate is set.
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }
}
