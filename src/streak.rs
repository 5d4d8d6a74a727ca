//! Every calculation works on the set of distinct UTC calendar days in its
//! input. Entries that cannot be read as a point in time are skipped.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Completion {
    Millis(i64),
    Text(String),
    // kept on save, never counted
    Other(serde_json::Value),
}

impl Completion {
    pub fn at_day_start(day: NaiveDate) -> Self {
        Completion::Text(format!("{}T00:00:00Z", day.format("%Y-%m-%d")))
    }

    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            Completion::Millis(millis) => {
                DateTime::<Utc>::from_timestamp_millis(*millis).map(|at| at.date_naive())
            }
            Completion::Text(text) => parse_day(text.trim()),
            Completion::Other(_) => None,
        }
    }
}

impl From<&str> for Completion {
    fn from(text: &str) -> Self {
        Completion::Text(text.to_string())
    }
}

fn parse_day(text: &str) -> Option<NaiveDate> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(at.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn normalize(completions: &[Completion]) -> BTreeSet<NaiveDate> {
    completions.iter().filter_map(Completion::day).collect()
}

pub fn completed_on(completions: &[Completion], day: NaiveDate) -> bool {
    completions.iter().any(|completion| completion.day() == Some(day))
}

pub fn current_streak(completions: &[Completion]) -> u32 {
    current_streak_at(completions, today_utc())
}

/// Consecutive completed days ending at `today`, or at yesterday when today
/// has not been completed yet.
pub fn current_streak_at(completions: &[Completion], today: NaiveDate) -> u32 {
    let days = normalize(completions);
    let yesterday = today.pred_opt();

    let anchor = if days.contains(&today) {
        today
    } else if let Some(yesterday) = yesterday.filter(|day| days.contains(day)) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    let mut expected = Some(anchor);
    for day in days.range(..=anchor).rev() {
        if Some(*day) != expected {
            break;
        }
        streak += 1;
        expected = day.pred_opt();
    }
    streak
}

pub fn days_in_window_at(completions: &[Completion], window_days: u32, today: NaiveDate) -> usize {
    if window_days == 0 {
        return 0;
    }
    // windows reaching past the earliest representable day start there
    let start = today
        .checked_sub_signed(Duration::days(i64::from(window_days) - 1))
        .unwrap_or(NaiveDate::MIN);
    normalize(completions).range(start..=today).count()
}

pub fn rolling_completion(completions: &[Completion], window_days: u32) -> u8 {
    rolling_completion_at(completions, window_days, today_utc())
}

pub fn rolling_completion_at(completions: &[Completion], window_days: u32, today: NaiveDate) -> u8 {
    if window_days == 0 {
        return 0;
    }
    let completed = days_in_window_at(completions, window_days, today) as f64;
    let percent = (completed / f64::from(window_days) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn entries(raw: &[&str]) -> Vec<Completion> {
        raw.iter().map(|text| Completion::from(*text)).collect()
    }

    fn days_back(offsets: impl IntoIterator<Item = i64>) -> Vec<Completion> {
        offsets
            .into_iter()
            .map(|offset| Completion::at_day_start(today() - Duration::days(offset)))
            .collect()
    }

    #[test]
    fn empty_input_has_no_streak_or_completion() {
        assert_eq!(current_streak_at(&[], today()), 0);
        assert_eq!(rolling_completion_at(&[], DEFAULT_WINDOW_DAYS, today()), 0);
    }

    #[test]
    fn completion_today_starts_a_streak() {
        assert_eq!(current_streak_at(&entries(&["2024-06-10"]), today()), 1);
    }

    #[test]
    fn completion_yesterday_keeps_streak_alive() {
        assert_eq!(current_streak_at(&entries(&["2024-06-09"]), today()), 1);
    }

    #[test]
    fn completion_two_days_ago_is_broken() {
        assert_eq!(current_streak_at(&entries(&["2024-06-08"]), today()), 0);
    }

    #[test]
    fn gap_stops_the_walk() {
        let input = entries(&["2024-06-10", "2024-06-09", "2024-06-08", "2024-06-06"]);
        assert_eq!(current_streak_at(&input, today()), 3);
    }

    #[test]
    fn same_day_timestamps_count_once() {
        let input = entries(&["2024-06-10T03:00:00Z", "2024-06-10T23:00:00Z"]);
        assert_eq!(current_streak_at(&input, today()), 1);
    }

    #[test]
    fn streak_anchored_on_yesterday_walks_back() {
        let input = days_back([1, 2, 3, 5]);
        assert_eq!(current_streak_at(&input, today()), 3);
    }

    #[test]
    fn order_and_duplicates_do_not_matter() {
        let base = entries(&[
            "2024-06-06",
            "2024-06-08T12:00:00Z",
            "2024-06-09",
            "2024-06-10T01:00:00Z",
        ]);
        let expected = current_streak_at(&base, today());
        assert_eq!(expected, 3);

        for rotation in 0..base.len() {
            let mut shuffled = base.clone();
            shuffled.rotate_left(rotation);
            assert_eq!(current_streak_at(&shuffled, today()), expected);
            shuffled.reverse();
            assert_eq!(current_streak_at(&shuffled, today()), expected);
        }

        let mut doubled = base.clone();
        doubled.extend(base.iter().cloned());
        doubled.push(Completion::from("2024-06-09T18:30:00Z"));
        assert_eq!(current_streak_at(&doubled, today()), expected);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let mut input = entries(&["not a date", "2024-13-40", "", "2024-06-10"]);
        input.push(Completion::Other(serde_json::json!({ "when": "today" })));
        input.push(Completion::Other(serde_json::json!(1.5)));
        assert_eq!(current_streak_at(&input, today()), 1);
        assert_eq!(normalize(&input).len(), 1);
    }

    #[test]
    fn epoch_millis_are_read_as_utc_days() {
        // 2024-06-09T23:59:59Z and 2024-06-10T00:00:01Z
        let input = vec![Completion::Millis(1_717_977_599_000), Completion::Millis(1_717_977_601_000)];
        assert_eq!(current_streak_at(&input, today()), 2);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        // 22:30 on the 9th in New York is already the 10th in UTC.
        let input = entries(&["2024-06-09T22:30:00-04:00"]);
        assert_eq!(normalize(&input).into_iter().collect::<Vec<_>>(), vec![today()]);
        assert!(completed_on(&input, today()));
    }

    #[test]
    fn naive_timestamps_are_accepted() {
        let input = entries(&["2024-06-10T07:15:00", "2024-06-09 21:00:00.250"]);
        assert_eq!(current_streak_at(&input, today()), 2);
    }

    #[test]
    fn future_days_are_not_counted() {
        let input = entries(&["2024-06-11", "2024-06-12", "2024-06-10"]);
        assert_eq!(current_streak_at(&input, today()), 1);
        assert_eq!(days_in_window_at(&input, 7, today()), 1);
    }

    #[test]
    fn streak_is_zero_without_today_or_yesterday() {
        let input = days_back(2..20);
        assert_eq!(current_streak_at(&input, today()), 0);
    }

    #[test]
    fn rolling_completion_rounds_to_whole_percent() {
        assert_eq!(rolling_completion_at(&days_back(0..30), 30, today()), 100);
        assert_eq!(rolling_completion_at(&days_back(0..15), 30, today()), 50);
        assert_eq!(rolling_completion_at(&days_back([0]), 30, today()), 3);
        assert_eq!(rolling_completion_at(&days_back([0, 1]), 3, today()), 67);
    }

    #[test]
    fn rolling_completion_ignores_days_outside_window() {
        let input = days_back([0, 29, 30, 45]);
        assert_eq!(days_in_window_at(&input, 30, today()), 2);
        assert_eq!(rolling_completion_at(&input, 30, today()), 7);
    }

    #[test]
    fn broken_streak_can_still_have_completion() {
        let input = days_back([3, 4, 5]);
        assert_eq!(current_streak_at(&input, today()), 0);
        assert_eq!(rolling_completion_at(&input, 30, today()), 10);
    }

    #[test]
    fn zero_window_yields_zero() {
        assert_eq!(days_in_window_at(&days_back(0..5), 0, today()), 0);
        assert_eq!(rolling_completion_at(&days_back(0..5), 0, today()), 0);
    }

    #[test]
    fn window_count_grows_with_window() {
        let input = days_back([0, 2, 3, 9, 17, 40, 41]);
        let mut previous = 0;
        for window in 1..=60 {
            let count = days_in_window_at(&input, window, today());
            assert!(count >= previous, "window {window} shrank from {previous} to {count}");
            previous = count;
        }
        assert_eq!(previous, 7);
    }

    #[test]
    fn mixed_json_entries_deserialize() {
        let input: Vec<Completion> = serde_json::from_value(serde_json::json!([
            "2024-06-10T00:00:00.000Z",
            1_717_891_200_000_i64,
            null,
            { "bad": true }
        ]))
        .unwrap();
        assert_eq!(input[1], Completion::Millis(1_717_891_200_000));
        assert_eq!(input[2], Completion::Other(serde_json::Value::Null));
        assert_eq!(current_streak_at(&input, today()), 2);
    }

    #[test]
    fn wall_clock_forms_use_the_current_day() {
        let input = vec![Completion::at_day_start(today_utc())];
        assert_eq!(current_streak(&input), 1);
        assert_eq!(rolling_completion(&input, 1), 100);
    }

    #[test]
    fn new_completions_are_written_at_midnight_utc() {
        assert_eq!(
            Completion::at_day_start(today()),
            Completion::Text("2024-06-10T00:00:00Z".to_string())
        );
    }

    #[test]
    fn huge_windows_start_at_the_earliest_day() {
        let input = entries(&["2024-06-10"]);
        assert_eq!(days_in_window_at(&input, u32::MAX, today()), 1);
        assert_eq!(rolling_completion_at(&input, u32::MAX, today()), 0);

        let spread = days_back([0, 5, 400, 100_000]);
        let mut previous = 0;
        for window in [1, 1_000, 1_000_000, 100_000_000, 1_000_000_000, u32::MAX] {
            let count = days_in_window_at(&spread, window, today());
            assert!(count >= previous, "window {window} shrank from {previous} to {count}");
            previous = count;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn earliest_representable_day_does_not_overflow() {
        let first = NaiveDate::MIN;
        let input = vec![Completion::Text(first.format("%Y-%m-%d").to_string())];
        assert_eq!(current_streak_at(&[], first), 0);
        assert_eq!(current_streak_at(&input, first) as usize, normalize(&input).len());
        assert_eq!(days_in_window_at(&input, 30, first), normalize(&input).len());
        assert_eq!(rolling_completion_at(&input, u32::MAX, first), 0);
    }
}
