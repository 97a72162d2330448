//! Session statistics over a calendar timeframe.
//!
//! Days are local calendar days in the timezone of the `now` argument, so
//! callers pass `Local::now()` in production and a fixed offset in tests.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::history::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Today,
    /// Calendar week starting on Sunday.
    Week,
    /// Calendar month starting on the 1st.
    Month,
    All,
}

impl Timeframe {
    /// First local date included by this timeframe, or `None` for `All`.
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Timeframe::Today => Some(today),
            Timeframe::Week => {
                let back = i64::from(today.weekday().num_days_from_sunday());
                Some(today - Duration::days(back))
            }
            Timeframe::Month => today.with_day(1),
            Timeframe::All => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Today => "today",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::All => "all",
        };
        f.write_str(s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(Timeframe::Today),
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "all" => Ok(Timeframe::All),
            other => Err(format!("unknown timeframe '{other}' (expected today, week, month or all)")),
        }
    }
}

/// Focus sessions completed on one local day; one histogram bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub focus_sessions: u32,
    pub focus_seconds: u64,
}

/// Focus sessions credited to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFocus {
    pub task_id: String,
    pub focus_sessions: u32,
    pub focus_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAverages {
    pub pomodoros: f64,
    pub focus_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub timeframe: Timeframe,
    pub pomodoros_completed: u32,
    pub focus_seconds: u64,
    pub break_seconds: u64,
    pub total_sessions: u32,
    /// Distinct local dates present in the filtered set.
    pub active_days: u32,
    /// Only computed for timeframes longer than a day.
    pub daily_average: Option<DailyAverages>,
    pub daily: Vec<DailyFocus>,
    pub by_task: Vec<TaskFocus>,
}

/// Aggregate `records` falling inside `timeframe` as seen from `now`.
pub fn aggregate<Tz: TimeZone>(
    records: &[SessionRecord],
    timeframe: Timeframe,
    now: &DateTime<Tz>,
) -> StatsSummary {
    let tz = now.timezone();
    let today = now.date_naive();
    let start = timeframe.start_date(today);

    let mut pomodoros_completed = 0u32;
    let mut focus_seconds = 0u64;
    let mut break_seconds = 0u64;
    let mut total_sessions = 0u32;
    let mut days: BTreeMap<NaiveDate, DailyFocus> = BTreeMap::new();
    let mut tasks: BTreeMap<&str, TaskFocus> = BTreeMap::new();

    for record in records {
        let date = record.start_time.with_timezone(&tz).date_naive();
        let included = match timeframe {
            Timeframe::Today => date == today,
            _ => start.map_or(true, |s| (s..=today).contains(&date)),
        };
        if !included {
            continue;
        }

        total_sessions += 1;
        let day = days.entry(date).or_insert_with(|| DailyFocus {
            date,
            focus_sessions: 0,
            focus_seconds: 0,
        });

        if record.is_focus() {
            pomodoros_completed += 1;
            focus_seconds += record.duration_seconds;
            day.focus_sessions += 1;
            day.focus_seconds += record.duration_seconds;
            if let Some(task_id) = record.task_id.as_deref() {
                let entry = tasks.entry(task_id).or_insert_with(|| TaskFocus {
                    task_id: task_id.to_string(),
                    focus_sessions: 0,
                    focus_seconds: 0,
                });
                entry.focus_sessions += 1;
                entry.focus_seconds += record.duration_seconds;
            }
        } else {
            break_seconds += record.duration_seconds;
        }
    }

    let active_days = days.len() as u32;
    let daily_average = (timeframe != Timeframe::Today).then(|| {
        let divisor = f64::from(active_days.max(1));
        DailyAverages {
            pomodoros: f64::from(pomodoros_completed) / divisor,
            focus_seconds: focus_seconds as f64 / divisor,
        }
    });

    let mut by_task: Vec<TaskFocus> = tasks.into_values().collect();
    by_task.sort_by(|a, b| b.focus_sessions.cmp(&a.focus_sessions).then(a.task_id.cmp(&b.task_id)));

    StatsSummary {
        timeframe,
        pomodoros_completed,
        focus_seconds,
        break_seconds,
        total_sessions,
        active_days,
        daily_average,
        daily: days.into_values().collect(),
        by_task,
    }
}
