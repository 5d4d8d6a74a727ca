use crate::models::{DailyPoint, HabitStats};
use crate::streak::{self, Completion};
use chrono::{Duration, NaiveDate};

pub const MAX_HISTORY_DAYS: u32 = 366;

pub fn summarize(completions: &[Completion], window_days: u32) -> HabitStats {
    summarize_at(streak::today_utc(), completions, window_days)
}

pub fn summarize_at(today: NaiveDate, completions: &[Completion], window_days: u32) -> HabitStats {
    HabitStats {
        current_streak: streak::current_streak_at(completions, today),
        completion_rate: streak::rolling_completion_at(completions, window_days, today),
        completed_today: streak::completed_on(completions, today),
        window_days,
    }
}

pub fn history(completions: &[Completion], days: u32) -> Vec<DailyPoint> {
    history_at(streak::today_utc(), completions, days)
}

pub fn history_at(today: NaiveDate, completions: &[Completion], days: u32) -> Vec<DailyPoint> {
    let completed = streak::normalize(completions);
    let days = days.min(MAX_HISTORY_DAYS);

    let mut points = Vec::with_capacity(days as usize);
    for offset in (0..days).rev() {
        let Some(date) = today.checked_sub_signed(Duration::days(i64::from(offset))) else {
            continue;
        };
        points.push(DailyPoint {
            date: date_key(date),
            completed: completed.contains(&date),
        });
    }
    points
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
