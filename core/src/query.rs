//! Client-side filtering and ordering of a locally held todo list.
//!
//! # Design
//! A `TodoQuery` is a pure transform: it borrows the list, never mutates it,
//! and returns a new vector. Filter criteria are conjunctive and an absent or
//! empty criterion lets everything through. Sorting is stable, so records that
//! compare equal keep their input order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Priority, Status, Todo};

/// Conjunctive filter over todo records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFilter {
    /// Exact, case-sensitive match on `client`.
    #[serde(default, alias = "project")]
    pub client: Option<String>,
    /// Case-insensitive substring of `task`.
    #[serde(default)]
    pub search: Option<String>,
    /// Case-insensitive substring of any tag.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl TodoFilter {
    pub fn by_client(client: impl Into<String>) -> Self {
        Self {
            client: Some(client.into()),
            ..Self::default()
        }
    }

    pub fn by_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(client) = non_empty(&self.client) {
            if todo.client.as_deref() != Some(client) {
                return false;
            }
        }

        if let Some(search) = non_empty(&self.search) {
            if !contains_ignore_case(&todo.task, search) {
                return false;
            }
        }

        if let Some(tag) = non_empty(&self.tag) {
            if !todo.tags.iter().any(|t| contains_ignore_case(t, tag)) {
                return false;
            }
        }

        if self.priority.is_some_and(|p| p != todo.priority) {
            return false;
        }

        if self.status.is_some_and(|s| s != todo.status) {
            return false;
        }

        true
    }
}

fn non_empty(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|s| !s.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Display order of a filtered list.
///
/// Deserializes through `from_key`, so an unknown key selects `Created`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortOrder {
    /// High, then Medium, then Low.
    Priority,
    /// Earliest due date first; undated records last.
    Deadline,
    /// Ascending by client label; a missing label sorts as "".
    Project,
    /// Newest first.
    #[default]
    Created,
}

impl SortOrder {
    /// Parse a UI sort key. Unknown keys fall back to `Created`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "priority" => SortOrder::Priority,
            "deadline" | "due_date" => SortOrder::Deadline,
            "project" | "client" => SortOrder::Project,
            _ => SortOrder::Created,
        }
    }

    pub fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortOrder::Priority => b.priority.rank().cmp(&a.priority.rank()),
            SortOrder::Deadline => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortOrder::Project => {
                let x = a.client.as_deref().unwrap_or("");
                let y = b.client.as_deref().unwrap_or("");
                x.cmp(y)
            }
            SortOrder::Created => b.created_at.cmp(&a.created_at),
        }
    }
}

impl From<String> for SortOrder {
    fn from(key: String) -> Self {
        SortOrder::from_key(&key)
    }
}

/// Filter plus ordering, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoQuery {
    #[serde(flatten)]
    pub filter: TodoFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

impl TodoQuery {
    pub fn new(filter: TodoFilter, sort: SortOrder) -> Self {
        Self { filter, sort }
    }

    pub fn sorted(sort: SortOrder) -> Self {
        Self {
            filter: TodoFilter::default(),
            sort,
        }
    }

    pub fn apply(&self, todos: &[Todo]) -> Vec<Todo> {
        let mut view: Vec<Todo> = todos
            .iter()
            .filter(|todo| self.filter.matches(todo))
            .cloned()
            .collect();
        // `sort_by` is stable.
        view.sort_by(|a, b| self.sort.compare(a, b));
        view
    }
}
