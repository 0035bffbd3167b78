//! Command-line interface for tick
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in the `task`, `category` and `stats`
//! submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::repository::TaskRepository;
use crate::storage::Storage;
use crate::task::TaskId;

mod category;
mod stats;
mod task;

/// tick - personal task tracking
///
/// Tasks with one level of subtasks, categories, priorities and due dates,
/// plus completion statistics.
#[derive(Parser, Debug)]
#[command(name = "tick")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding tasks.json and friends (defaults to the platform data dir)
    #[arg(long, global = true, env = "TICK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        desc: Option<String>,

        /// Category id (defaults to tasks.default_category)
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// Create a subtask under a top-level task
    Subtask {
        /// Parent task id
        parent: TaskId,

        /// Subtask title
        title: String,

        /// Longer description
        #[arg(long)]
        desc: Option<String>,

        /// Category id (defaults to the parent's)
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },

    /// List the non-archived subtasks of a task
    Subtasks {
        /// Parent task id
        parent: TaskId,
    },

    /// List tasks (active top-level tasks by default)
    List {
        /// Only completed tasks
        #[arg(long, conflicts_with_all = ["archived", "category", "all"])]
        completed: bool,

        /// Only archived tasks (any level)
        #[arg(long, conflicts_with_all = ["category", "all"])]
        archived: bool,

        /// Only tasks in this category
        #[arg(short, long, conflicts_with = "all")]
        category: Option<String>,

        /// Every task, archived and subtasks included
        #[arg(long)]
        all: bool,

        /// Show subtasks under their parents
        #[arg(long, conflicts_with_all = ["archived", "all"])]
        tree: bool,
    },

    /// Show one task and its subtasks
    Show {
        /// Task id
        id: TaskId,
    },

    /// Search titles and descriptions (case-insensitive)
    Search {
        /// Text to look for
        query: String,
    },

    /// Change fields of a task
    Edit {
        /// Task id
        id: TaskId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        desc: Option<String>,

        /// New category id
        #[arg(short, long)]
        category: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Mark a task completed
    Done {
        /// Task id
        id: TaskId,
    },

    /// Mark a completed task as not completed
    Reopen {
        /// Task id
        id: TaskId,
    },

    /// Archive a task
    Archive {
        /// Task id
        id: TaskId,
    },

    /// Restore an archived task
    Restore {
        /// Task id
        id: TaskId,
    },

    /// Delete tasks permanently (subtasks go with their parent)
    Delete {
        /// Task ids; with several ids unknown ones are skipped
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },

    /// List categories with their open-task counts
    Categories,

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Productivity statistics
    Stats {
        /// Completions per day for the current week
        #[arg(long, conflicts_with = "priority")]
        weekly: bool,

        /// Open tasks per priority
        #[arg(long)]
        priority: bool,
    },

    /// Show recent entries of the history journal
    Log {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Display name
        name: String,

        /// Explicit id (derived from the name by default)
        #[arg(long)]
        id: Option<String>,

        /// Color, e.g. "#8B85F0"
        #[arg(long)]
        color: Option<String>,

        /// Icon name
        #[arg(long)]
        icon: Option<String>,
    },

    /// Change a category's name, color or icon
    Edit {
        /// Category id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        icon: Option<String>,
    },

    /// Remove a category (its tasks keep their categoryId)
    Rm {
        /// Category id
        id: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let data_dir = self.data_dir;
        let json = self.json;
        let quiet = self.quiet;

        match self.command {
            Commands::Add { title, desc, category, priority, due } => {
                task::run_add(task::AddOptions {
                    title,
                    desc,
                    category,
                    priority,
                    due,
                    data_dir,
                    json,
                    quiet,
                })
            }
            Commands::Subtask { parent, title, desc, category, priority, due } => {
                task::run_subtask(task::SubtaskOptions {
                    parent,
                    title,
                    desc,
                    category,
                    priority,
                    due,
                    data_dir,
                    json,
                    quiet,
                })
            }
            Commands::Subtasks { parent } => task::run_subtasks(task::SubtasksOptions {
                parent,
                data_dir,
                json,
                quiet,
            }),
            Commands::List { completed, archived, category, all, tree } => {
                task::run_list(task::ListOptions {
                    completed,
                    archived,
                    category,
                    all,
                    tree,
                    data_dir,
                    json,
                    quiet,
                })
            }
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                data_dir,
                json,
                quiet,
            }),
            Commands::Search { query } => task::run_search(task::SearchOptions {
                query,
                data_dir,
                json,
                quiet,
            }),
            Commands::Edit { id, title, desc, category, priority, due, clear_due } => {
                task::run_edit(task::EditOptions {
                    id,
                    title,
                    desc,
                    category,
                    priority,
                    due,
                    clear_due,
                    data_dir,
                    json,
                    quiet,
                })
            }
            Commands::Done { id } => task::run_set_completed(task::CompletionOptions {
                id,
                completed: true,
                data_dir,
                json,
                quiet,
            }),
            Commands::Reopen { id } => task::run_set_completed(task::CompletionOptions {
                id,
                completed: false,
                data_dir,
                json,
                quiet,
            }),
            Commands::Archive { id } => task::run_set_archived(task::ArchiveOptions {
                id,
                archived: true,
                data_dir,
                json,
                quiet,
            }),
            Commands::Restore { id } => task::run_set_archived(task::ArchiveOptions {
                id,
                archived: false,
                data_dir,
                json,
                quiet,
            }),
            Commands::Delete { ids } => task::run_delete(task::DeleteOptions {
                ids,
                data_dir,
                json,
                quiet,
            }),
            Commands::Log { limit } => task::run_log(task::LogOptions {
                limit,
                data_dir,
                json,
                quiet,
            }),
            Commands::Categories => category::run_list(category::ListOptions {
                data_dir,
                json,
                quiet,
            }),
            Commands::Category(cmd) => match cmd {
                CategoryCommands::Add { name, id, color, icon } => {
                    category::run_add(category::AddOptions {
                        name,
                        id,
                        color,
                        icon,
                        data_dir,
                        json,
                        quiet,
                    })
                }
                CategoryCommands::Edit { id, name, color, icon } => {
                    category::run_edit(category::EditOptions {
                        id,
                        name,
                        color,
                        icon,
                        data_dir,
                        json,
                        quiet,
                    })
                }
                CategoryCommands::Rm { id } => category::run_rm(category::RmOptions {
                    id,
                    data_dir,
                    json,
                    quiet,
                }),
            },
            Commands::Stats { weekly, priority } => stats::run(stats::StatsOptions {
                weekly,
                priority,
                data_dir,
                json,
                quiet,
            }),
        }
    }
}

/// Repository plus the configuration it was opened with.
struct Context {
    repo: TaskRepository,
    config: Config,
}

fn load_context(data_dir: Option<PathBuf>) -> Result<Context> {
    let storage = match data_dir {
        Some(dir) => Storage::new(dir),
        None => Storage::default_location()?,
    };
    let config = Config::load_from_dir(storage.data_dir());
    tracing::debug!(data_dir = %storage.data_dir().display(), "opening task repository");
    let repo = TaskRepository::new(storage, &config);
    Ok(Context { repo, config })
}
