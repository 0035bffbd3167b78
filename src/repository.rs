//! Persistent task repository.
//!
//! Wraps an in-memory [`TaskStore`] with the on-disk snapshot in the data
//! directory. Reads load the snapshot as-is; every mutation runs as
//! lock, load, apply, atomic write, journal. A failed mutation writes nothing;
//! the journal is best-effort and may lag the snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::category::{Category, CategoryPatch, CategoryRegistry, NewCategory};
use crate::config::Config;
use crate::error::Result;
use crate::lock::FileLock;
use crate::storage::Storage;
use crate::store::{TaskDefaults, TaskStore};
use crate::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskTree};

const TASKS_SCHEMA_VERSION: &str = "tickoff.tasks.v1";

/// On-disk form of `tasks.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_id: TaskId,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            last_id: 0,
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    TaskCreated,
    SubtaskCreated,
    TaskUpdated,
    TaskCompleted,
    TaskReopened,
    ParentAutoCompleted,
    TaskArchived,
    TaskRestored,
    TaskDeleted,
}

impl HistoryEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryEventType::TaskCreated => "task_created",
            HistoryEventType::SubtaskCreated => "subtask_created",
            HistoryEventType::TaskUpdated => "task_updated",
            HistoryEventType::TaskCompleted => "task_completed",
            HistoryEventType::TaskReopened => "task_reopened",
            HistoryEventType::ParentAutoCompleted => "parent_auto_completed",
            HistoryEventType::TaskArchived => "task_archived",
            HistoryEventType::TaskRestored => "task_restored",
            HistoryEventType::TaskDeleted => "task_deleted",
        }
    }
}

/// One line of `history.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub event_id: String,
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub event_type: HistoryEventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl HistoryEvent {
    pub fn new(event_type: HistoryEventType, task: &Task) -> Self {
        Self {
            event_id: Ulid::new().to_string(),
            task_id: task.id,
            event_type,
            timestamp: Utc::now(),
            title: Some(task.title.clone()),
        }
    }
}

/// What an update changed, as reported back to the CLI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_completed_parent: Option<Task>,
}

#[derive(Debug, Clone)]
pub struct TaskRepository {
    storage: Storage,
    defaults: TaskDefaults,
    lock_timeout_ms: u64,
}

impl TaskRepository {
    pub fn new(storage: Storage, config: &Config) -> Self {
        Self {
            storage,
            defaults: config.task_defaults(),
            lock_timeout_ms: config.storage.lock_timeout_ms,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current snapshot, empty when nothing has been written yet.
    pub fn snapshot(&self) -> Result<TaskSnapshot> {
        Ok(self
            .storage
            .read_json_opt(&self.storage.tasks_file())?
            .unwrap_or_else(TaskSnapshot::empty))
    }

    pub fn load_store(&self) -> Result<TaskStore> {
        let snapshot = self.snapshot()?;
        Ok(TaskStore::from_parts(
            snapshot.tasks,
            snapshot.last_id,
            self.defaults.clone(),
        ))
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self.load_store()?.list(filter))
    }

    pub fn get(&self, id: TaskId) -> Result<Task> {
        self.load_store()?.get(id)
    }

    pub fn search(&self, query: &str) -> Result<Vec<Task>> {
        Ok(self.load_store()?.search(query))
    }

    pub fn subtasks(&self, parent_id: TaskId) -> Result<Vec<Task>> {
        let store = self.load_store()?;
        store.get(parent_id)?;
        Ok(store.subtasks(parent_id))
    }

    pub fn tree(&self, filter: &TaskFilter) -> Result<Vec<TaskTree>> {
        Ok(self.load_store()?.tree(filter))
    }

    /// Most recent journal entries, newest last. `None` returns everything.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEvent>> {
        let mut events: Vec<HistoryEvent> = self.storage.read_jsonl(&self.storage.history_file())?;
        if let Some(limit) = limit {
            let skip = events.len().saturating_sub(limit);
            events.drain(..skip);
        }
        Ok(events)
    }

    // =========================================================================
    // Task mutations
    // =========================================================================

    pub fn create(&self, fields: NewTask) -> Result<Task> {
        self.mutate(|store| {
            let task = store.create(fields)?;
            let events = vec![HistoryEvent::new(HistoryEventType::TaskCreated, &task)];
            Ok((task, events))
        })
    }

    pub fn create_subtask(&self, parent_id: TaskId, fields: NewTask) -> Result<Task> {
        self.mutate(|store| {
            let task = store.create_subtask(parent_id, fields)?;
            let events = vec![HistoryEvent::new(HistoryEventType::SubtaskCreated, &task)];
            Ok((task, events))
        })
    }

    pub fn update(&self, id: TaskId, patch: TaskPatch) -> Result<UpdateReport> {
        self.mutate(|store| {
            let before = store.get(id)?;
            let outcome = store.apply_update(id, patch)?;
            let after = &outcome.task;

            let mut events = vec![HistoryEvent::new(HistoryEventType::TaskUpdated, after)];
            match (before.completed, after.completed) {
                (false, true) => events.push(HistoryEvent::new(HistoryEventType::TaskCompleted, after)),
                (true, false) => events.push(HistoryEvent::new(HistoryEventType::TaskReopened, after)),
                _ => {}
            }
            match (before.archived, after.archived) {
                (false, true) => events.push(HistoryEvent::new(HistoryEventType::TaskArchived, after)),
                (true, false) => events.push(HistoryEvent::new(HistoryEventType::TaskRestored, after)),
                _ => {}
            }
            if let Some(parent) = outcome.cascaded_parent.as_ref() {
                events.push(HistoryEvent::new(HistoryEventType::ParentAutoCompleted, parent));
            }

            let report = UpdateReport {
                task: outcome.task,
                auto_completed_parent: outcome.cascaded_parent,
            };
            Ok((report, events))
        })
    }

    pub fn complete(&self, id: TaskId) -> Result<UpdateReport> {
        self.update(id, TaskPatch::completed(true))
    }

    pub fn reopen(&self, id: TaskId) -> Result<UpdateReport> {
        self.update(id, TaskPatch::completed(false))
    }

    pub fn archive(&self, id: TaskId) -> Result<Task> {
        self.update(id, TaskPatch::archived(true)).map(|report| report.task)
    }

    pub fn restore(&self, id: TaskId) -> Result<Task> {
        self.update(id, TaskPatch::archived(false)).map(|report| report.task)
    }

    /// Delete one task (and its subtasks). Returns every removed record.
    pub fn delete(&self, id: TaskId) -> Result<Vec<Task>> {
        self.mutate(|store| {
            let removed = store.remove(id)?.into_tasks();
            let events = deletion_events(&removed);
            Ok((removed, events))
        })
    }

    /// Delete every existing id, skipping unknown ones.
    pub fn bulk_delete(&self, ids: &[TaskId]) -> Result<Vec<Task>> {
        self.mutate(|store| {
            let removed = store.bulk_delete(ids);
            let events = deletion_events(&removed);
            Ok((removed, events))
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// The category registry, seeded with the defaults on first use.
    pub fn categories(&self) -> Result<CategoryRegistry> {
        Ok(self
            .storage
            .read_json_opt::<Vec<Category>>(&self.storage.categories_file())?
            .map(CategoryRegistry::from_categories)
            .unwrap_or_default())
    }

    pub fn create_category(&self, fields: NewCategory) -> Result<Category> {
        self.mutate_categories(|registry| registry.create(fields))
    }

    pub fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<Category> {
        self.mutate_categories(|registry| registry.update(id, patch))
    }

    pub fn delete_category(&self, id: &str) -> Result<Category> {
        self.mutate_categories(|registry| registry.delete(id))
    }

    // =========================================================================
    // Locked read-modify-write
    // =========================================================================

    fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut TaskStore) -> Result<(T, Vec<HistoryEvent>)>,
    {
        self.storage.init()?;
        let _lock = FileLock::acquire(self.storage.lock_file(), self.lock_timeout_ms)?;

        let mut store = self.load_store()?;
        let (result, events) = apply(&mut store)?;
        if events.is_empty() {
            debug!("mutation changed nothing; snapshot left as is");
            return Ok(result);
        }

        let (tasks, last_id) = store.into_parts();
        let snapshot = TaskSnapshot {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            last_id,
            tasks,
        };
        self.storage.write_json(&self.storage.tasks_file(), &snapshot)?;

        // The snapshot is the commit point; a journal failure must not report
        // the mutation as failed.
        let history_file = self.storage.history_file();
        for event in &events {
            if let Err(err) = self.storage.append_jsonl(&history_file, event) {
                warn!(path = %history_file.display(), error = %err, "history journal not updated");
                break;
            }
        }
        info!(events = events.len(), tasks = snapshot.tasks.len(), "task snapshot written");

        Ok(result)
    }

    fn mutate_categories<F>(&self, apply: F) -> Result<Category>
    where
        F: FnOnce(&mut CategoryRegistry) -> Result<Category>,
    {
        self.storage.init()?;
        let _lock = FileLock::acquire(self.storage.lock_file(), self.lock_timeout_ms)?;

        let mut registry = self.categories()?;
        let category = apply(&mut registry)?;
        self.storage
            .write_json(&self.storage.categories_file(), registry.categories())?;
        info!(category = %category.id, "category registry written");

        Ok(category)
    }
}

fn deletion_events(removed: &[Task]) -> Vec<HistoryEvent> {
    removed
        .iter()
        .map(|task| HistoryEvent::new(HistoryEventType::TaskDeleted, task))
        .collect()
}
