//! Domain types for the todo service.
//!
//! # Design
//! One `Todo` shape serves every consumer: the store, the HTTP surface and the
//! client-side query layer. Field aliases accept the spellings used by the
//! simpler list variants (`text`, `deadline`, `project`, `createdAt`) so their
//! payloads deserialize into the same record.
//!
//! `TodoFields` is the full mutable field set. Create and update both take it;
//! an update replaces every mutable field rather than patching.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Store-assigned record identifier.
pub type TodoId = i64;

/// Priority of a todo. Declared highest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "high")]
    High,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Numeric weight used for ordering; higher sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidPriority(s.to_string()))
    }
}

/// Progress of a todo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In-Progress",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// A persisted todo record.
///
/// Deserialization is lenient so that lists cached by the simpler variants
/// still load: see `TodoRecord`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "TodoRecord")]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<NaiveDate>,
    pub client: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape accepted for a `Todo`.
///
/// Unrecognized or empty priority text reads as `Medium`. A boolean
/// `completed` stands in for `status` when `status` is absent. A missing
/// creation time reads as the Unix epoch, so such records sort oldest.
#[derive(Deserialize)]
struct TodoRecord {
    id: TodoId,
    #[serde(alias = "text")]
    task: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default, alias = "deadline")]
    due_date: Option<NaiveDate>,
    #[serde(default, alias = "project")]
    client: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

impl From<TodoRecord> for Todo {
    fn from(record: TodoRecord) -> Self {
        let priority = record
            .priority
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or_default();
        let status = match (record.status, record.completed) {
            (Some(status), _) => status,
            (None, Some(true)) => Status::Completed,
            (None, _) => Status::Pending,
        };
        Todo {
            id: record.id,
            task: record.task,
            priority,
            status,
            due_date: record.due_date,
            client: record.client,
            tags: record.tags,
            created_at: record.created_at.unwrap_or_default(),
        }
    }
}

impl Todo {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// The mutable part of this record, e.g. to edit and send back as an update.
    pub fn fields(&self) -> TodoFields {
        TodoFields {
            task: self.task.clone(),
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            client: self.client.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Request payload for creating a todo or overwriting an existing one.
///
/// `task` defaults to empty when missing so that validation, not
/// deserialization, reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoFields {
    #[serde(default, alias = "text")]
    pub task: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, alias = "deadline", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, alias = "project", skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TodoFields {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check and normalize the field set.
    ///
    /// `task` is trimmed and must be non-empty. A blank `client` becomes
    /// `None`. Tags are trimmed, blanks dropped and duplicates removed,
    /// keeping first occurrences in order.
    pub fn validate(self) -> Result<TodoFields, ValidationError> {
        let task = self.task.trim();
        if task.is_empty() {
            return Err(ValidationError::MissingTask);
        }

        let client = self
            .client
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        Ok(TodoFields {
            task: task.to_string(),
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            client,
            tags,
        })
    }
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: TodoId,
    pub message: String,
}

impl DeleteConfirmation {
    pub fn new(id: TodoId) -> Self {
        Self {
            id,
            message: format!("Todo with id {id} deleted successfully."),
        }
    }
}

/// JSON body of every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Machine-readable kind: `validation_error`, `not_found` or `storage_error`.
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo {
            id: 7,
            task: "Test".to_string(),
            priority: Priority::High,
            status: Status::InProgress,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            client: Some("Acme".to_string()),
            tags: vec!["ops".to_string()],
            created_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["task"], "Test");
        assert_eq!(json["priority"], "High");
        assert_eq!(json["status"], "In-Progress");
        assert_eq!(json["due_date"], "2024-03-01");
        assert_eq!(json["client"], "Acme");
        assert_eq!(json["tags"][0], "ops");
        assert_eq!(json["created_at"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn todo_accepts_local_variant_field_names() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":1,"text":"Ship","priority":"low","deadline":"2024-05-06",
                "project":"Acme","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(todo.task, "Ship");
        assert_eq!(todo.priority, Priority::Low);
        assert_eq!(todo.status, Status::Pending);
        assert_eq!(todo.due_date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(todo.client.as_deref(), Some("Acme"));
        assert!(todo.tags.is_empty());
    }

    #[test]
    fn todo_maps_completed_flag_onto_status() {
        let done: Todo = serde_json::from_str(
            r#"{"id":1,"text":"done","completed":true,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(done.status, Status::Completed);
        assert!(done.is_completed());

        let open: Todo = serde_json::from_str(
            r#"{"id":2,"text":"open","completed":false,"createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(open.status, Status::Pending);

        let explicit: Todo = serde_json::from_str(
            r#"{"id":3,"task":"x","status":"In-Progress","completed":true,
                "created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(explicit.status, Status::InProgress);
    }

    #[test]
    fn todo_reads_unknown_priority_as_medium() {
        let todos: Vec<Todo> = serde_json::from_str(
            r#"[{"id":1,"task":"a","priority":"urgent","created_at":"2024-01-01T00:00:00Z"},
                {"id":2,"task":"b","priority":"","created_at":"2024-01-01T00:00:00Z"},
                {"id":3,"task":"c","priority":"HIGH","created_at":"2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let priorities: Vec<Priority> = todos.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![Priority::Medium, Priority::Medium, Priority::High]);
    }

    #[test]
    fn todo_without_creation_time_reads_as_epoch() {
        let todo: Todo =
            serde_json::from_str(r#"{"id":1700000000000,"text":"x","completed":false}"#).unwrap();
        assert_eq!(todo.id, 1_700_000_000_000);
        assert_eq!(todo.created_at, DateTime::<Utc>::default());
        assert_eq!(todo.created_at.timestamp(), 0);
    }

    #[test]
    fn todo_json_round_trips() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":9,"task":"A","priority":"Low","status":"Completed",
                "due_date":"2024-02-03","tags":["x"],"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let back: Todo = serde_json::from_value(serde_json::to_value(&todo).unwrap()).unwrap();
        assert_eq!(back, todo);
    }

    #[test]
    fn fields_reject_unknown_priority() {
        let result: Result<TodoFields, _> =
            serde_json::from_str(r#"{"task":"x","priority":"urgent"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn fields_default_priority_and_status() {
        let fields: TodoFields = serde_json::from_str(r#"{"task":"Buy milk"}"#).unwrap();
        assert_eq!(fields.priority, Priority::Medium);
        assert_eq!(fields.status, Status::Pending);
        assert!(fields.due_date.is_none());
        assert!(fields.client.is_none());
    }

    #[test]
    fn fields_missing_task_deserializes_then_fails_validation() {
        let fields: TodoFields = serde_json::from_str(r#"{"priority":"High"}"#).unwrap();
        assert_eq!(fields.validate(), Err(ValidationError::MissingTask));
    }

    #[test]
    fn fields_reject_unknown_status() {
        let result: Result<TodoFields, _> =
            serde_json::from_str(r#"{"task":"x","status":"Blocked"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_blank_task() {
        assert_eq!(
            TodoFields::new("   ").validate(),
            Err(ValidationError::MissingTask)
        );
    }

    #[test]
    fn validate_normalizes_fields() {
        let fields = TodoFields::new("  Call back  ")
            .with_client("  ")
            .with_tag(" home ")
            .with_tag("")
            .with_tag("home")
            .with_tag("errand")
            .validate()
            .unwrap();
        assert_eq!(fields.task, "Call back");
        assert!(fields.client.is_none());
        assert_eq!(fields.tags, vec!["home".to_string(), "errand".to_string()]);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn status_round_trips_through_its_text_form() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("in-progress".parse::<Status>().is_err());
    }

    #[test]
    fn fields_of_todo_skip_identity() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":3,"task":"A","client":"Acme","created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let fields = todo.fields();
        assert_eq!(fields, TodoFields::new("A").with_client("Acme"));
    }
}
