//! Shared output formatting for tick CLI commands.
//!
//! Every command produces one result. With `--json` it is printed as an
//! [`Envelope`]; otherwise the command's [`HumanOutput`] is rendered as text.

use std::fmt;

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "tick.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text report: a header line, `key: value` summary rows, then
/// optional bulleted sections.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    fn sections(&self) -> [(&'static str, &[String]); 3] {
        [
            ("Details", &self.details),
            ("Warnings", &self.warnings),
            ("Next steps", &self.next_steps),
        ]
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;

        if !self.summary.is_empty() {
            f.write_str("\n\nSummary:")?;
            for (key, value) in &self.summary {
                if value.is_empty() {
                    write!(f, "\n- {key}")?;
                } else {
                    write!(f, "\n- {key}: {value}")?;
                }
            }
        }

        for (title, items) in self.sections() {
            if items.is_empty() {
                continue;
            }
            write!(f, "\n\n{title}:")?;
            for item in items {
                write!(f, "\n- {item}")?;
            }
        }
        Ok(())
    }
}

pub fn format_human(output: &HumanOutput) -> String {
    output.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The `tick.v1` JSON document. Exactly one of `data` and `error` is set.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub schema_version: &'static str,
    pub command: &'a str,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn success(command: &'a str, data: &'a T, human: Option<&HumanOutput>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Success,
            data: Some(data),
            error: None,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
        }
    }
}

impl<'a> Envelope<'a, ()> {
    pub fn failure(command: &'a str, err: &Error) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            command,
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            warnings: Vec::new(),
            next_steps: error_next_steps(err),
        }
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = Envelope::success(command, data, human);
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if let (false, Some(human)) = (options.quiet, human) {
        println!("{human}");
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let envelope = Envelope::failure(command, err);
    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = envelope.next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Command label for the JSON envelope, e.g. `add` or `category rm`.
pub fn infer_command_name_from_args() -> String {
    command_name(std::env::args().skip(1))
}

fn command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    let mut positionals: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--data-dir" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        positionals.push(arg);
        let grouped = positionals[0] == "category";
        if !grouped || positionals.len() == 2 {
            break;
        }
    }

    if positionals.is_empty() {
        "tick".to_string()
    } else {
        positionals.join(" ")
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    let hint = match err {
        Error::NotFound(_) => "tick list --all".to_string(),
        Error::NestedSubtask(id) => format!("tick show {id}"),
        Error::CategoryNotFound(_) => "tick categories".to_string(),
        Error::InvalidConfig(_) => "fix tickoff.toml then retry".to_string(),
        Error::LockFailed(_) => "retry once the other tick process finishes".to_string(),
        _ => return Vec::new(),
    };
    vec![hint]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(args: &[&str]) -> String {
        command_name(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn command_name_skips_global_flags() {
        assert_eq!(name(&[]), "tick");
        assert_eq!(name(&["--json", "add", "Write report"]), "add");
        assert_eq!(name(&["--data-dir", "/tmp/x", "done", "3"]), "done");
        assert_eq!(name(&["category", "--json", "rm", "work"]), "category rm");
    }

    #[test]
    fn human_output_sections_render_in_order() {
        let mut human = HumanOutput::new("tick add: created task 1");
        human.push_summary("title", "Write report");
        human.push_summary("archived", "");
        human.push_detail("#1 Write report");
        human.push_warning("category 'misc' is not registered");
        human.push_next_step("tick show 1");

        let text = format_human(&human);
        let expected = "tick add: created task 1\n\nSummary:\n- title: Write report\n- archived\n\n\
Details:\n- #1 Write report\n\nWarnings:\n- category 'misc' is not registered\n\n\
Next steps:\n- tick show 1";
        assert_eq!(text, expected);
        assert_eq!(format_human(&HumanOutput::new("Tasks")), "Tasks");
    }

    #[test]
    fn success_envelope_carries_warnings_and_data() {
        let mut human = HumanOutput::new("Tasks deleted");
        human.push_warning("not found, skipped: #9");
        let data = serde_json::json!({ "removed": [] });

        let value = serde_json::to_value(Envelope::success("delete", &data, Some(&human)))
            .expect("json");
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], data);
        assert_eq!(value["warnings"][0], "not found, skipped: #9");
        assert!(value.get("error").is_none());
        assert!(value.get("next_steps").is_none());
    }

    #[test]
    fn failure_envelope_has_kind_and_hint() {
        let value = serde_json::to_value(Envelope::failure("show", &Error::NotFound(4)))
            .expect("json");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["kind"], "user_error");
        assert_eq!(value["error"]["code"], exit_codes::USER_ERROR);
        assert_eq!(value["error"]["details"]["id"], 4);
        assert_eq!(value["next_steps"][0], "tick list --all");
        assert!(value.get("data").is_none());

        let failed = Error::OperationFailed("disk full".to_string());
        let value = serde_json::to_value(Envelope::failure("add", &failed)).expect("json");
        assert_eq!(value["error"]["kind"], "operation_failed");
        assert!(value.get("next_steps").is_none());
    }
}
