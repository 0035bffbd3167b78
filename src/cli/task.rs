//! tick task command implementations.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::repository::{HistoryEvent, TaskRepository, UpdateReport};
use crate::task::{NewTask, Priority, Task, TaskFilter, TaskId, TaskPatch, TaskTree};

use super::load_context;

pub struct AddOptions {
    pub title: String,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SubtaskOptions {
    pub parent: TaskId,
    pub title: String,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SubtasksOptions {
    pub parent: TaskId,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub completed: bool,
    pub archived: bool,
    pub category: Option<String>,
    pub all: bool,
    pub tree: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: TaskId,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SearchOptions {
    pub query: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: TaskId,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompletionOptions {
    pub id: TaskId,
    pub completed: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ArchiveOptions {
    pub id: TaskId,
    pub archived: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub ids: Vec<TaskId>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct LogOptions {
    pub limit: usize,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct TaskTreeOutput {
    total: usize,
    tasks: Vec<TaskTree>,
}

#[derive(Serialize)]
struct DeleteOutput {
    requested: Vec<TaskId>,
    removed: Vec<Task>,
}

#[derive(Serialize)]
struct LogOutput {
    total: usize,
    events: Vec<HistoryEvent>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let fields = new_task_fields(
        &ctx.repo,
        &options.title,
        options.desc,
        options.category,
        options.priority.as_deref(),
        options.due.as_deref(),
    )?;
    let task = ctx.repo.create(fields)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("tick subtask {} \"...\"", task.id));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &task,
        Some(&human),
    )
}

pub fn run_subtask(options: SubtaskOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let fields = new_task_fields(
        &ctx.repo,
        &options.title,
        options.desc,
        options.category,
        options.priority.as_deref(),
        options.due.as_deref(),
    )?;
    let task = ctx.repo.create_subtask(options.parent, fields)?;

    let mut human = HumanOutput::new("Subtask created");
    push_task_summary(&mut human, &task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtask",
        &task,
        Some(&human),
    )
}

pub fn run_subtasks(options: SubtasksOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let tasks = ctx.repo.subtasks(options.parent)?;

    let mut human = HumanOutput::new(format!("Subtasks of #{}", options.parent));
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "subtasks",
        &TaskListOutput {
            total: tasks.len(),
            tasks,
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (filter, label) = if options.all {
        (TaskFilter::all(), "All tasks".to_string())
    } else if options.completed {
        (TaskFilter::completed(), "Completed tasks".to_string())
    } else if options.archived {
        (TaskFilter::archived(), "Archived tasks".to_string())
    } else if let Some(category) = options.category {
        let label = format!("Tasks in {category}");
        (TaskFilter::in_category(category), label)
    } else {
        (TaskFilter::active(), "Tasks".to_string())
    };
    let output_options = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    if options.tree {
        let trees = ctx.repo.tree(&filter)?;
        let mut human = HumanOutput::new(label);
        human.push_summary("Total", trees.len().to_string());
        for tree in &trees {
            let mut line = format_task_line(&tree.task);
            if !tree.subtasks.is_empty() {
                line.push_str(&format!(
                    " [{}/{} subtasks]",
                    tree.completed_subtasks(),
                    tree.subtasks.len()
                ));
            }
            human.push_detail(line);
            for subtask in &tree.subtasks {
                human.push_detail(format!("  {}", format_task_line(subtask)));
            }
        }
        return emit_success(
            output_options,
            "list",
            &TaskTreeOutput {
                total: trees.len(),
                tasks: trees,
            },
            Some(&human),
        );
    }

    let tasks = ctx.repo.list(&filter)?;
    let mut human = HumanOutput::new(label);
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }
    if tasks.is_empty() {
        human.push_next_step("tick add \"...\"");
    }

    emit_success(
        output_options,
        "list",
        &TaskListOutput {
            total: tasks.len(),
            tasks,
        },
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let store = ctx.repo.load_store()?;
    let task = store.get(options.id)?;
    let subtasks = if task.is_top_level() {
        store.subtasks(task.id)
    } else {
        Vec::new()
    };

    let mut human = HumanOutput::new(format!("Task #{}", task.id));
    push_task_summary(&mut human, &task);
    if !task.description.is_empty() {
        human.push_summary("Description", task.description.clone());
    }
    human.push_summary("Created", task.created_at.to_rfc3339());
    if let Some(completed_at) = task.completed_at {
        human.push_summary("Completed", completed_at.to_rfc3339());
    }
    if let Some(parent_id) = task.parent_id {
        human.push_summary("Parent", format!("#{parent_id}"));
    }
    for subtask in &subtasks {
        human.push_detail(format_task_line(subtask));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &TaskTree { task, subtasks },
        Some(&human),
    )
}

pub fn run_search(options: SearchOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let tasks = ctx.repo.search(&options.query)?;

    let mut human = HumanOutput::new(format!("Search: {}", options.query));
    human.push_summary("Matches", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "search",
        &TaskListOutput {
            total: tasks.len(),
            tasks,
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;

    let title = match options.title {
        Some(title) => Some(validate_title(&title)?),
        None => None,
    };
    if let Some(category) = options.category.as_deref() {
        ctx.repo.categories()?.get(category)?;
    }
    let due_date = if options.clear_due {
        Some(None)
    } else {
        parse_due(options.due.as_deref())?.map(Some)
    };
    let patch = TaskPatch {
        title,
        description: options.desc,
        category_id: options.category,
        priority: parse_priority(options.priority.as_deref())?,
        due_date,
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --title, --desc, --category, --priority, --due or --clear-due)"
                .to_string(),
        ));
    }

    let report = ctx.repo.update(options.id, patch)?;
    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &report.task);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &report.task,
        Some(&human),
    )
}

pub fn run_set_completed(options: CompletionOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (report, command, header) = if options.completed {
        (ctx.repo.complete(options.id)?, "done", "Task completed")
    } else {
        (ctx.repo.reopen(options.id)?, "reopen", "Task reopened")
    };

    let human = completion_human(header, &report);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &report,
        Some(&human),
    )
}

pub fn run_set_archived(options: ArchiveOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (task, command, header) = if options.archived {
        (ctx.repo.archive(options.id)?, "archive", "Task archived")
    } else {
        (ctx.repo.restore(options.id)?, "restore", "Task restored")
    };

    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &task);
    if options.archived {
        human.push_next_step(format!("tick restore {}", task.id));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &task,
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let removed = match options.ids.as_slice() {
        [id] => ctx.repo.delete(*id)?,
        ids => ctx.repo.bulk_delete(ids)?,
    };

    let mut human = HumanOutput::new("Tasks deleted");
    human.push_summary("Removed", removed.len().to_string());
    for task in &removed {
        human.push_detail(format_task_line(task));
    }
    let skipped: Vec<String> = options
        .ids
        .iter()
        .filter(|id| !removed.iter().any(|task| task.id == **id))
        .map(|id| format!("#{id}"))
        .collect();
    if !skipped.is_empty() {
        human.push_warning(format!("not found, skipped: {}", skipped.join(", ")));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "delete",
        &DeleteOutput {
            requested: options.ids,
            removed,
        },
        Some(&human),
    )
}

pub fn run_log(options: LogOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let events = ctx.repo.history(Some(options.limit))?;

    let mut human = HumanOutput::new("History");
    human.push_summary("Entries", events.len().to_string());
    for event in &events {
        let mut line = format!(
            "{} {} #{}",
            event.timestamp.to_rfc3339(),
            event.event_type.as_str(),
            event.task_id
        );
        if let Some(title) = event.title.as_deref() {
            line.push_str(&format!(" {title}"));
        }
        human.push_detail(line);
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "log",
        &LogOutput {
            total: events.len(),
            events,
        },
        Some(&human),
    )
}

fn new_task_fields(
    repo: &TaskRepository,
    title: &str,
    description: Option<String>,
    category: Option<String>,
    priority: Option<&str>,
    due: Option<&str>,
) -> Result<NewTask> {
    let title = validate_title(title)?;
    if let Some(category) = category.as_deref() {
        repo.categories()?.get(category)?;
    }
    Ok(NewTask {
        title,
        description,
        category_id: category,
        priority: parse_priority(priority)?,
        due_date: parse_due(due)?,
    })
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

fn parse_priority(value: Option<&str>) -> Result<Option<Priority>> {
    value.map(str::parse::<Priority>).transpose()
}

fn parse_due(value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|err| {
            Error::InvalidArgument(format!("invalid due date '{value}' (expected YYYY-MM-DD): {err}"))
        })
}

fn completion_human(header: &str, report: &UpdateReport) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &report.task);
    if let Some(parent) = report.auto_completed_parent.as_ref() {
        human.push_detail(format!(
            "all subtasks done; parent #{} \"{}\" completed",
            parent.id, parent.title
        ));
    }
    human
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Category", task.category_id.clone());
    human.push_summary("Priority", task.priority.to_string());
    if let Some(due) = task.due_date {
        human.push_summary("Due", due.to_string());
    }
    human.push_summary("Completed", if task.completed { "yes" } else { "no" });
    if task.archived {
        human.push_summary("Archived", "yes");
    }
}

fn format_task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{mark}] #{} {} ({}, {})",
        task.id, task.title, task.category_id, task.priority
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {due}"));
    }
    if task.archived {
        line.push_str(" (archived)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_dates_must_be_iso() {
        assert_eq!(
            parse_due(Some("2026-03-01")).expect("due"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(parse_due(None).expect("none"), None);
        assert!(matches!(parse_due(Some("03/01/2026")), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn titles_are_trimmed_and_non_empty() {
        assert_eq!(validate_title("  Write report ").expect("title"), "Write report");
        assert!(matches!(validate_title("   "), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn priority_flag_is_optional() {
        assert_eq!(parse_priority(None).expect("none"), None);
        assert_eq!(parse_priority(Some("High")).expect("high"), Some(Priority::High));
        assert!(parse_priority(Some("p0")).is_err());
    }
}
