//! Task data model — tasks, priorities, and task-type lookups.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Task urgency bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    Important,
    Normal,
    Low,
}

impl Priority {
    /// DB / wire string for this priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::Important => "important",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// All priorities in descending urgency, for form contexts.
    pub fn all() -> [Priority; 4] {
        [
            Priority::Critical,
            Priority::Important,
            Priority::Normal,
            Priority::Low,
        ]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Priority::Critical),
            "important" => Ok(Priority::Important),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A labeled category of task (e.g. "Bug", "New feature").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: Uuid,
    pub name: String,
}

/// A unit of work with a priority, deadline, and assignee set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID.
    pub id: Uuid,
    /// Short title. Lists are ordered by this field.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Urgency bucket.
    pub priority: Priority,
    /// Due date.
    pub deadline: NaiveDate,
    /// Whether the task has been finished.
    pub is_completed: bool,
    /// Category reference (if any).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type_id: Option<Uuid>,
    /// Workers assigned to this task.
    pub assignees: Vec<Uuid>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(name: impl Into<String>, priority: Priority, deadline: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            priority,
            deadline,
            is_completed: false,
            task_type_id: None,
            assignees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set description.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set task type.
    pub fn with_task_type(mut self, type_id: Uuid) -> Self {
        self.task_type_id = Some(type_id);
        self
    }

    /// Builder: set assignees.
    pub fn with_assignees(mut self, assignees: Vec<Uuid>) -> Self {
        self.assignees = assignees;
        self
    }
}

/// Payload for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub task_type_id: Option<Uuid>,
    #[serde(default)]
    pub assignees: Vec<Uuid>,
}

impl NewTask {
    /// Validate the payload and build a `Task`.
    pub fn into_task(self) -> Result<Task, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::field("name", "must not be empty"));
        }
        if name.len() > 255 {
            return Err(ValidationError::field("name", "must be at most 255 characters"));
        }

        let mut task = Task::new(name, self.priority, self.deadline)
            .with_description(self.description)
            .with_assignees(self.assignees);
        task.task_type_id = self.task_type_id;
        Ok(task)
    }
}

/// Partial payload for updating a task. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub task_type_id: Option<Uuid>,
    #[serde(default)]
    pub assignees: Option<Vec<Uuid>>,
}

impl TaskUpdate {
    /// Apply this update to an existing task, validating changed fields.
    pub fn apply_to(&self, task: &mut Task) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::field("name", "must not be empty"));
            }
            if name.len() > 255 {
                return Err(ValidationError::field("name", "must be at most 255 characters"));
            }
            task.name = name.to_string();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(done) = self.is_completed {
            task.is_completed = done;
        }
        if let Some(type_id) = self.task_type_id {
            task.task_type_id = Some(type_id);
        }
        if let Some(ref assignees) = self.assignees {
            task.assignees = assignees.clone();
        }
        task.updated_at = Utc::now();
        Ok(())
    }
}

/// Global entity counts shown on the open index view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardCounts {
    pub tasks: u64,
    pub workers: u64,
    pub positions: u64,
    pub task_types: u64,
}
