//! Productivity statistics derived from a task snapshot.
//!
//! Every function here is a pure projection over `&[Task]`. Calendar days are
//! taken in the time zone of the `now` argument, so the CLI passes
//! `Local::now()` and tests pin a fixed instant.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// Upper bound on how many days the streak walk inspects.
pub const MAX_STREAK_DAYS: u32 = 365;

/// First day of the week for weekly figures.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// First day of the week containing `date`.
    pub fn week_of(self, date: NaiveDate) -> NaiveDate {
        let offset = match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            WeekStart::Monday => date.weekday().num_days_from_monday(),
        };
        date - Duration::days(i64::from(offset))
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_tasks: usize,
    pub completed_today: usize,
    pub completed_this_week: usize,
    pub streak: u32,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub completed: usize,
    pub day_name: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PriorityBreakdown {
    pub urgent: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.urgent + self.high + self.medium + self.low
    }
}

pub fn user_stats<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, week_start: WeekStart) -> UserStats {
    let today = now.date_naive();
    let week_begins = week_start.week_of(today);

    let total_tasks = tasks.iter().filter(|task| !task.archived).count();
    let completion_days: Vec<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed && !task.archived)
        .filter_map(|task| completion_day(task, now))
        .collect();
    let completed_total = tasks
        .iter()
        .filter(|task| task.completed && !task.archived)
        .count();

    let completed_today = completion_days.iter().filter(|day| **day == today).count();
    let completed_this_week = completion_days
        .iter()
        .filter(|day| **day >= week_begins)
        .count();

    let active_days: HashSet<NaiveDate> = completion_days.into_iter().collect();
    let streak = streak_from(&active_days, today);

    UserStats {
        total_tasks,
        completed_today,
        completed_this_week,
        streak,
        completion_rate: completion_rate(completed_total, total_tasks),
    }
}

/// Percentage of `completed` over `total`, rounded; zero when `total` is zero.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 * 100.0 / total as f64).round() as u32
}

/// Consecutive days with at least one completion, counting back from `today`.
/// A day without completions ends the walk, today included.
fn streak_from(active_days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while streak < MAX_STREAK_DAYS && active_days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Completions per day for the seven days of the current week.
pub fn weekly_stats<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>, week_start: WeekStart) -> Vec<DailyCount> {
    let first = week_start.week_of(now.date_naive());
    let days: Vec<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed)
        .filter_map(|task| completion_day(task, now))
        .collect();

    (0..7)
        .map(|offset| {
            let date = first + Duration::days(offset);
            DailyCount {
                date,
                completed: days.iter().filter(|day| **day == date).count(),
                day_name: date.format("%a").to_string(),
            }
        })
        .collect()
}

/// Open (not completed, not archived) tasks per priority.
pub fn priority_breakdown(tasks: &[Task]) -> PriorityBreakdown {
    let mut breakdown = PriorityBreakdown::default();
    for task in tasks.iter().filter(|task| task.is_open()) {
        match task.priority {
            Priority::Urgent => breakdown.urgent += 1,
            Priority::High => breakdown.high += 1,
            Priority::Medium => breakdown.medium += 1,
            Priority::Low => breakdown.low += 1,
        }
    }
    breakdown
}

fn completion_day<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<NaiveDate> {
    task.completed_at
        .map(|at| at.with_timezone(&now.timezone()).date_naive())
}
