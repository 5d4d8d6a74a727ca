use crate::streak::Completion;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub completed_dates: Vec<Completion>,
    #[serde(default)]
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Marks `today` complete, or clears every entry on `today` if it already
    /// is. Returns whether the habit ends up completed for the day.
    pub fn toggle_completion(&mut self, today: NaiveDate) -> bool {
        let before = self.completed_dates.len();
        self.completed_dates
            .retain(|completion| completion.day() != Some(today));
        if self.completed_dates.len() != before {
            return false;
        }

        self.completed_dates.push(Completion::at_day_start(today));
        self.completed_dates.sort_by_key(Completion::day);
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub habits: BTreeMap<Uuid, Habit>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WindowQuery {
    pub window: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub current_streak: u32,
    pub completion_rate: u8,
    pub completed_today: bool,
    pub window_days: u32,
}

#[derive(Debug, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    #[serde(flatten)]
    pub stats: HabitStats,
}

#[derive(Debug, Serialize)]
pub struct PublicHabitView {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
}

impl From<&Habit> for PublicHabitView {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id,
            owner: habit.owner.clone(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            frequency: habit.frequency,
            created_at: habit.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub id: Uuid,
    pub days: u32,
    pub completed_days: usize,
    pub points: Vec<DailyPoint>,
}
