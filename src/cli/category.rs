//! tick category command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::category::{self, Category, CategoryCount, CategoryPatch, NewCategory};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::TaskFilter;

use super::load_context;

pub struct ListOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct AddOptions {
    pub name: String,
    pub id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryListOutput {
    all_tasks: usize,
    categories: Vec<CategoryCount>,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let registry = ctx.repo.categories()?;
    let tasks = ctx.repo.list(&TaskFilter::all())?;
    let counts = category::counts(registry.categories(), &tasks);
    let all_tasks = category::all_tasks_count(&counts);

    let mut human = HumanOutput::new("Categories");
    human.push_summary("All Tasks", all_tasks.to_string());
    for entry in &counts {
        human.push_detail(format!(
            "{} ({}): {} open",
            entry.category.name, entry.category.id, entry.task_count
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "categories",
        &CategoryListOutput {
            all_tasks,
            categories: counts,
        },
        Some(&human),
    )
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let created = ctx.repo.create_category(NewCategory {
        id: options.id,
        name: options.name,
        color: options.color,
        icon: options.icon,
    })?;

    let mut human = HumanOutput::new("Category created");
    push_category_summary(&mut human, &created);
    human.push_next_step(format!("tick add \"...\" --category {}", created.id));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category add",
        &created,
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    if options.name.is_none() && options.color.is_none() && options.icon.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to change (pass --name, --color or --icon)".to_string(),
        ));
    }
    let ctx = load_context(options.data_dir)?;
    let updated = ctx.repo.update_category(
        &options.id,
        CategoryPatch {
            name: options.name,
            color: options.color,
            icon: options.icon,
        },
    )?;

    let mut human = HumanOutput::new("Category updated");
    push_category_summary(&mut human, &updated);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category edit",
        &updated,
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let removed = ctx.repo.delete_category(&options.id)?;
    let orphaned = ctx
        .repo
        .list(&TaskFilter::all())?
        .iter()
        .filter(|task| task.category_id == removed.id)
        .count();

    let mut human = HumanOutput::new("Category removed");
    push_category_summary(&mut human, &removed);
    if orphaned > 0 {
        human.push_warning(format!(
            "{orphaned} task(s) still reference category '{}'",
            removed.id
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category rm",
        &removed,
        Some(&human),
    )
}

fn push_category_summary(human: &mut HumanOutput, category: &Category) {
    human.push_summary("ID", category.id.clone());
    human.push_summary("Name", category.name.clone());
    human.push_summary("Color", category.color.clone());
    human.push_summary("Icon", category.icon.clone());
}
