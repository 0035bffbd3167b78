//! tick stats command implementation.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::analytics::{self, DailyCount, PriorityBreakdown, UserStats, WeekStart};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{Priority, TaskFilter};

use super::load_context;

pub struct StatsOptions {
    pub weekly: bool,
    pub priority: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeeklyOutput {
    week_start: WeekStart,
    total: usize,
    days: Vec<DailyCount>,
}

pub fn run(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let tasks = ctx.repo.list(&TaskFilter::all())?;
    let week_start = ctx.config.analytics.week_start;
    let now = Local::now();
    let output_options = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    if options.weekly {
        let days = analytics::weekly_stats(&tasks, &now, week_start);
        let output = WeeklyOutput {
            week_start,
            total: days.iter().map(|day| day.completed).sum(),
            days,
        };
        let human = weekly_human(&output);
        return emit_success(output_options, "stats", &output, Some(&human));
    }

    if options.priority {
        let breakdown = analytics::priority_breakdown(&tasks);
        let human = priority_human(&breakdown);
        return emit_success(output_options, "stats", &breakdown, Some(&human));
    }

    let stats = analytics::user_stats(&tasks, &now, week_start);
    let human = summary_human(&stats);
    emit_success(output_options, "stats", &stats, Some(&human))
}

fn summary_human(stats: &UserStats) -> HumanOutput {
    let mut human = HumanOutput::new("Productivity");
    human.push_summary("Total tasks", stats.total_tasks.to_string());
    human.push_summary("Completed today", stats.completed_today.to_string());
    human.push_summary("Completed this week", stats.completed_this_week.to_string());
    human.push_summary("Completion rate", format!("{}%", stats.completion_rate));
    let unit = if stats.streak == 1 { "day" } else { "days" };
    human.push_summary("Streak", format!("{} {unit}", stats.streak));
    if stats.total_tasks == 0 {
        human.push_next_step("tick add \"...\"");
    }
    human
}

fn weekly_human(output: &WeeklyOutput) -> HumanOutput {
    let mut human = HumanOutput::new("This week");
    human.push_summary("Completed", output.total.to_string());
    for day in &output.days {
        human.push_detail(format!(
            "{} {} {:>3} {}",
            day.day_name,
            day.date,
            day.completed,
            "#".repeat(day.completed)
        ));
    }
    human
}

fn priority_human(breakdown: &PriorityBreakdown) -> HumanOutput {
    let mut human = HumanOutput::new("Open tasks by priority");
    human.push_summary("Total", breakdown.total().to_string());
    for priority in Priority::DESCENDING {
        human.push_detail(format!("{:<6} {}", priority.as_str(), breakdown.get(priority)));
    }
    human
}
