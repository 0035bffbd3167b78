#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Scratch data directory for one test.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.file("tickoff.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// `tick` pointed at this data directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = tick_cmd();
        cmd.env_remove("RUST_LOG");
        cmd.env("TICK_DATA_DIR", self.dir.path());
        cmd
    }

    /// Runs `tick --json <args>` expecting success and returns the `data` payload.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).assert().success();
        let value: Value = serde_json::from_slice(&output.get_output().stdout)?;
        assert_eq!(value["status"], "success");
        Ok(value["data"].clone())
    }

    /// Runs `tick --json <args>` expecting failure and returns the whole envelope.
    pub fn json_error(&self, args: &[&str], code: i32) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .code(code);
        let value: Value = serde_json::from_slice(&output.get_output().stdout)?;
        assert_eq!(value["status"], "error");
        Ok(value)
    }

    /// Creates a task and returns its id.
    pub fn add(&self, args: &[&str]) -> Result<u64, Box<dyn std::error::Error>> {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let data = self.json(&full)?;
        data["id"].as_u64().ok_or_else(|| "missing id".into())
    }

    /// Creates a subtask under `parent` and returns its id.
    pub fn add_subtask(&self, parent: u64, title: &str) -> Result<u64, Box<dyn std::error::Error>> {
        let parent = parent.to_string();
        let data = self.json(&["subtask", &parent, title])?;
        data["id"].as_u64().ok_or_else(|| "missing id".into())
    }
}

pub fn tick_cmd() -> Command {
    Command::cargo_bin("tick").expect("binary")
}

pub fn ids(tasks: &Value) -> Vec<u64> {
    tasks
        .as_array()
        .map(|items| items.iter().filter_map(|task| task["id"].as_u64()).collect())
        .unwrap_or_default()
}
