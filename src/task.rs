//! Task records and the value types that flow through the task store.
//!
//! A task with a `parentId` is a subtask. Subtasks live in the same id space
//! as top-level tasks and are stored in the same flat collection.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type TaskId = u64;

pub const DEFAULT_CATEGORY: &str = "personal";

/// Task urgency, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Display order used by the priority breakdown (most pressing first).
    pub const DESCENDING: [Priority; 4] =
        [Priority::Urgent, Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(Error::InvalidArgument(format!(
                "unknown priority '{trimmed}' (expected low|medium|high|urgent)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
}

impl Task {
    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Open means neither completed nor archived.
    pub fn is_open(&self) -> bool {
        !self.completed && !self.archived
    }
}

/// Fields accepted when creating a task. Anything left out gets a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. Only the mutable fields of a task appear here; `id`,
/// `createdAt`, `completedAt` and `parentId` are not patchable.
///
/// `due_date` is doubly optional: `None` leaves the date alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Which level of the hierarchy a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Level {
    #[default]
    Any,
    TopLevel,
    ChildOf(TaskId),
}

/// Predicate over `{categoryId, completed, archived, parent}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub category_id: Option<String>,
    pub completed: Option<bool>,
    pub archived: Option<bool>,
    pub level: Level,
}

impl TaskFilter {
    /// Every task, archived or not, at any level.
    pub fn all() -> Self {
        Self::default()
    }

    /// Non-archived top-level tasks.
    pub fn active() -> Self {
        Self {
            archived: Some(false),
            level: Level::TopLevel,
            ..Self::default()
        }
    }

    /// Completed, non-archived top-level tasks.
    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            ..Self::active()
        }
    }

    /// Non-archived top-level tasks in one category.
    pub fn in_category(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..Self::active()
        }
    }

    /// Archived tasks at any level.
    pub fn archived() -> Self {
        Self {
            archived: Some(true),
            ..Self::default()
        }
    }

    /// Non-archived subtasks of one parent.
    pub fn subtasks_of(parent_id: TaskId) -> Self {
        Self {
            archived: Some(false),
            level: Level::ChildOf(parent_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category_id) = self.category_id.as_deref() {
            if task.category_id != category_id {
                return false;
            }
        }
        if self.completed.is_some_and(|completed| task.completed != completed) {
            return false;
        }
        if self.archived.is_some_and(|archived| task.archived != archived) {
            return false;
        }
        match self.level {
            Level::Any => true,
            Level::TopLevel => task.is_top_level(),
            Level::ChildOf(parent_id) => task.parent_id == Some(parent_id),
        }
    }
}

/// A top-level task together with its subtasks. Subtasks are plain tasks, so
/// the view is exactly two levels deep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTree {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<Task>,
}

impl TaskTree {
    /// Number of completed subtasks, rendered as `done/total` by the CLI.
    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|task| task.completed).count()
    }
}
