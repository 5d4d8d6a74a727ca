use crate::streak::DEFAULT_WINDOW_DAYS;
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/habits.json";
pub const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub window_days: u32,
}

impl Config {
    pub fn load() -> Self {
        let window_days = parse_or("HABIT_WINDOW_DAYS", env::var("HABIT_WINDOW_DAYS").ok(), DEFAULT_WINDOW_DAYS);

        Self {
            port: parse_or("PORT", env::var("PORT").ok(), DEFAULT_PORT),
            data_path: env::var("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
            window_days: checked_window(window_days),
        }
    }
}

pub fn window_in_range(window_days: u32) -> bool {
    (1..=MAX_WINDOW_DAYS).contains(&window_days)
}

fn checked_window(window_days: u32) -> u32 {
    if window_in_range(window_days) {
        return window_days;
    }
    warn!("HABIT_WINDOW_DAYS must be between 1 and {MAX_WINDOW_DAYS}, using default: {DEFAULT_WINDOW_DAYS}");
    DEFAULT_WINDOW_DAYS
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|err| {
        warn!("Invalid {key} value {raw:?}: {err}, using default: {default}");
        default
    })
}
