//! In-memory task store.
//!
//! `TaskStore` owns the canonical task collection and is the only place that
//! mutates it. It enforces id allocation, parent/child consistency, the
//! completion timestamp rule and the forward-only completion cascade.
//! Persistence lives in [`crate::repository`], which wraps a `TaskStore`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::task::{NewTask, Priority, Task, TaskFilter, TaskId, TaskPatch, TaskTree, DEFAULT_CATEGORY};

/// Values applied to fields a caller leaves out of [`NewTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefaults {
    pub category_id: String,
    pub priority: Priority,
}

impl Default for TaskDefaults {
    fn default() -> Self {
        Self {
            category_id: DEFAULT_CATEGORY.to_string(),
            priority: Priority::Medium,
        }
    }
}

/// Result of an update, including the parent the cascade completed (if any).
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub task: Task,
    pub cascaded_parent: Option<Task>,
}

/// A deleted task plus the subtasks removed along with it.
#[derive(Debug, Clone)]
pub struct Removal {
    pub task: Task,
    pub subtasks: Vec<Task>,
}

impl Removal {
    pub fn into_tasks(self) -> Vec<Task> {
        let mut removed = Vec::with_capacity(self.subtasks.len() + 1);
        removed.push(self.task);
        removed.extend(self.subtasks);
        removed
    }
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: TaskId,
    defaults: TaskDefaults,
    clock: fn() -> DateTime<Utc>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new(TaskDefaults::default())
    }
}

impl TaskStore {
    pub fn new(defaults: TaskDefaults) -> Self {
        Self {
            tasks: Vec::new(),
            last_id: 0,
            defaults,
            clock: Utc::now,
        }
    }

    /// Rebuild a store from persisted parts. `last_id` is the highest id ever
    /// handed out; it is raised to the largest id present if lower.
    pub fn from_parts(tasks: Vec<Task>, last_id: TaskId, defaults: TaskDefaults) -> Self {
        let max_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Self {
            tasks,
            last_id: last_id.max(max_id),
            defaults,
            clock: Utc::now,
        }
    }

    /// Replace the time source used for `createdAt` and `completedAt`.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_parts(self) -> (Vec<Task>, TaskId) {
        (self.tasks, self.last_id)
    }

    /// Next id to allocate. Never reuses an id, even after the task holding
    /// the current maximum has been deleted.
    pub fn next_id(&self) -> Result<TaskId> {
        let max_id = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        self.last_id
            .max(max_id)
            .checked_add(1)
            .ok_or_else(|| Error::InvalidArgument("task id space exhausted".to_string()))
    }

    pub fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.find(id).cloned().ok_or(Error::NotFound(id))
    }

    /// Case-insensitive substring match on title or description, limited to
    /// non-archived top-level tasks.
    pub fn search(&self, query: &str) -> Vec<Task> {
        let needle = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|task| !task.archived && task.is_top_level())
            .filter(|task| {
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn subtasks(&self, parent_id: TaskId) -> Vec<Task> {
        self.list(&TaskFilter::subtasks_of(parent_id))
    }

    /// Two-level view: each top-level task matching `filter` with its
    /// non-archived subtasks.
    pub fn tree(&self, filter: &TaskFilter) -> Vec<TaskTree> {
        self.tasks
            .iter()
            .filter(|task| task.is_top_level() && filter.matches(task))
            .map(|task| TaskTree {
                task: task.clone(),
                subtasks: self.subtasks(task.id),
            })
            .collect()
    }

    pub fn create(&mut self, fields: NewTask) -> Result<Task> {
        let category_id = fields
            .category_id
            .clone()
            .unwrap_or_else(|| self.defaults.category_id.clone());
        self.insert(fields, category_id, None)
    }

    /// Create a subtask under `parent_id`. The parent must exist and must be
    /// a top-level task. The category defaults to the parent's.
    pub fn create_subtask(&mut self, parent_id: TaskId, fields: NewTask) -> Result<Task> {
        let parent = self.find(parent_id).ok_or(Error::NotFound(parent_id))?;
        if parent.is_subtask() {
            return Err(Error::NestedSubtask(parent_id));
        }
        let category_id = fields
            .category_id
            .clone()
            .unwrap_or_else(|| parent.category_id.clone());
        self.insert(fields, category_id, Some(parent_id))
    }

    fn insert(&mut self, fields: NewTask, category_id: String, parent_id: Option<TaskId>) -> Result<Task> {
        let id = self.next_id()?;
        let task = Task {
            id,
            title: fields.title,
            description: fields.description.unwrap_or_default(),
            category_id,
            priority: fields.priority.unwrap_or(self.defaults.priority),
            due_date: fields.due_date,
            completed: false,
            completed_at: None,
            created_at: (self.clock)(),
            archived: false,
            parent_id,
        };
        self.last_id = id;
        self.tasks.push(task.clone());
        debug!(id, ?parent_id, "task created");
        Ok(task)
    }

    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.apply_update(id, patch).map(|outcome| outcome.task)
    }

    /// Merge `patch` into task `id` and run the completion cascade.
    ///
    /// `completedAt` is set when `completed` goes false to true and cleared
    /// when it goes true to false. When the patch changes `completed` on a
    /// subtask and every sibling is now complete, an incomplete parent is
    /// completed too. The cascade never reopens a parent.
    pub fn apply_update(&mut self, id: TaskId, patch: TaskPatch) -> Result<UpdateOutcome> {
        let now = (self.clock)();
        let index = self.position(id).ok_or(Error::NotFound(id))?;

        let task = &mut self.tasks[index];
        let was_completed = task.completed;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = category_id;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(archived) = patch.archived {
            task.archived = archived;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        match (was_completed, task.completed) {
            (false, true) => task.completed_at = Some(now),
            (true, false) => task.completed_at = None,
            _ => {}
        }
        let completion_changed = was_completed != task.completed;
        let updated = task.clone();
        debug!(id, completed = updated.completed, archived = updated.archived, "task updated");

        let cascaded_parent = match updated.parent_id {
            Some(parent_id) if completion_changed => self.cascade_completion(parent_id, now),
            _ => None,
        };

        Ok(UpdateOutcome {
            task: updated,
            cascaded_parent,
        })
    }

    fn cascade_completion(&mut self, parent_id: TaskId, now: DateTime<Utc>) -> Option<Task> {
        let all_done = self
            .tasks
            .iter()
            .filter(|task| task.parent_id == Some(parent_id))
            .all(|task| task.completed);
        if !all_done {
            return None;
        }
        let index = self.position(parent_id)?;
        let parent = &mut self.tasks[index];
        if parent.completed {
            return None;
        }
        parent.completed = true;
        parent.completed_at = Some(now);
        info!(parent_id, "all subtasks complete; parent completed");
        Some(parent.clone())
    }

    pub fn archive(&mut self, id: TaskId) -> Result<Task> {
        self.update(id, TaskPatch::archived(true))
    }

    pub fn restore(&mut self, id: TaskId) -> Result<Task> {
        self.update(id, TaskPatch::archived(false))
    }

    /// Physically remove task `id` and return it. Deleting a top-level task
    /// also removes its subtasks.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        self.remove(id).map(|removal| removal.task)
    }

    pub fn remove(&mut self, id: TaskId) -> Result<Removal> {
        let index = self.position(id).ok_or(Error::NotFound(id))?;
        let task = self.tasks.remove(index);
        let mut subtasks = Vec::new();
        if task.is_top_level() {
            let (children, rest): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
                .into_iter()
                .partition(|candidate| candidate.parent_id == Some(id));
            self.tasks = rest;
            subtasks = children;
        }
        debug!(id, subtasks = subtasks.len(), "task deleted");
        Ok(Removal { task, subtasks })
    }

    /// Delete every id that exists, silently skipping the rest. Returns all
    /// records actually removed, cascaded subtasks included.
    pub fn bulk_delete(&mut self, ids: &[TaskId]) -> Vec<Task> {
        let mut seen = HashSet::new();
        let mut removed = Vec::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Ok(removal) = self.remove(id) {
                removed.extend(removal.into_tasks());
            }
        }
        removed
    }

    fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}
