//! tickoff - personal task tracking library
//!
//! This library provides the core functionality for the `tick` CLI:
//! a task store with one level of subtasks and a completion cascade,
//! per-category open-task counts, and productivity statistics.
//!
//! # Core Concepts
//!
//! - **Tasks**: titled records with category, priority, optional due date,
//!   completion and archive flags
//! - **Subtasks**: tasks with a `parentId`; completing the last open subtask
//!   completes the parent (never the reverse)
//! - **Categories**: flat registry decorated with open-task counts
//! - **Analytics**: totals, completion rate, streak, weekly series and
//!   priority breakdown, all derived on demand
//!
//! # Module Organization
//!
//! - `task`: task record, patch, filter and tree types
//! - `store`: in-memory task store and its invariants
//! - `repository`: file-backed store with locking and a history journal
//! - `category`: category registry and per-category counts
//! - `analytics`: derived statistics
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `tickoff.toml`
//! - `error`: error types and result aliases
//! - `storage`: data directory layout and atomic file I/O
//! - `lock`: file locking for concurrency safety
//! - `output`: human and JSON output for CLI commands

pub mod analytics;
pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod repository;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
