use crate::config::{window_in_range, MAX_WINDOW_DAYS};
use crate::errors::AppError;
use crate::models::{
    AppData, CreateHabitRequest, DeleteResponse, Frequency, Habit, HabitView, HistoryQuery,
    HistoryResponse, PublicHabitView, UpdateHabitRequest, WindowQuery,
};
use crate::state::AppState;
use crate::stats::{history_at, summarize_at, MAX_HISTORY_DAYS};
use crate::storage::persist_data;
use crate::streak::today_utc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

const DEFAULT_HISTORY_DAYS: u32 = 7;

pub async fn index() -> &'static str {
    "Habit tracker API is running"
}

pub async fn list_habits(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<HabitView>>, AppError> {
    let window_days = resolve_window(&state, query.window)?;
    let today = today_utc();
    let data = state.data.lock().await;

    let mut habits: Vec<&Habit> = data.habits.values().filter(|h| h.owner == user).collect();
    habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(
        habits
            .into_iter()
            .map(|habit| to_view(habit.clone(), today, window_days))
            .collect(),
    ))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, Uuid)>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<HabitView>, AppError> {
    let window_days = resolve_window(&state, query.window)?;
    let data = state.data.lock().await;
    let habit = owned_habit(&data, &user, id)?.clone();

    Ok(Json(to_view(habit, today_utc(), window_days)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<WindowQuery>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitView>), AppError> {
    let window_days = resolve_window(&state, query.window)?;
    let name = required_name(payload.name.as_deref())?;
    let frequency = parse_frequency(payload.frequency.as_deref())?.unwrap_or_default();

    let habit = Habit {
        id: Uuid::new_v4(),
        owner: user,
        name,
        description: payload.description,
        frequency,
        completed_dates: Vec::new(),
        is_public: payload.is_public.unwrap_or(false),
        created_at: Utc::now(),
    };

    let mut data = state.data.lock().await;
    store_habit(&state, &mut data, habit.id, Some(habit.clone())).await?;
    info!(habit = %habit.id, owner = %habit.owner, "habit created");

    Ok((StatusCode::CREATED, Json(to_view(habit, today_utc(), window_days))))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, Uuid)>,
    Query(query): Query<WindowQuery>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitView>, AppError> {
    let window_days = resolve_window(&state, query.window)?;
    let frequency = parse_frequency(payload.frequency.as_deref())?;
    let name = match payload.name.as_deref() {
        Some(name) => Some(required_name(Some(name))?),
        None => None,
    };

    let mut data = state.data.lock().await;
    let mut habit = owned_habit(&data, &user, id)?.clone();
    if let Some(name) = name {
        habit.name = name;
    }
    if let Some(description) = payload.description {
        habit.description = Some(description);
    }
    if let Some(frequency) = frequency {
        habit.frequency = frequency;
    }
    if let Some(is_public) = payload.is_public {
        habit.is_public = is_public;
    }

    store_habit(&state, &mut data, id, Some(habit.clone())).await?;

    Ok(Json(to_view(habit, today_utc(), window_days)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, Uuid)>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut data = state.data.lock().await;
    owned_habit(&data, &user, id)?;
    store_habit(&state, &mut data, id, None).await?;
    info!(habit = %id, owner = %user, "habit deleted");

    Ok(Json(DeleteResponse {
        id,
        message: "Habit removed successfully".to_string(),
    }))
}

pub async fn toggle_complete(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, Uuid)>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<HabitView>, AppError> {
    let window_days = resolve_window(&state, query.window)?;
    let today = today_utc();

    let mut data = state.data.lock().await;
    let mut habit = owned_habit(&data, &user, id)?.clone();
    let completed = habit.toggle_completion(today);

    store_habit(&state, &mut data, id, Some(habit.clone())).await?;
    info!(habit = %id, %today, completed, "completion toggled");

    Ok(Json(to_view(habit, today, window_days)))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path((user, id)): Path<(String, Uuid)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }

    let data = state.data.lock().await;
    let habit = owned_habit(&data, &user, id)?;
    let points = history_at(today_utc(), &habit.completed_dates, days);

    Ok(Json(HistoryResponse {
        id,
        days,
        completed_days: points.iter().filter(|point| point.completed).count(),
        points,
    }))
}

pub async fn public_habits(State(state): State<AppState>) -> Json<Vec<PublicHabitView>> {
    let data = state.data.lock().await;
    let mut habits: Vec<&Habit> = data.habits.values().filter(|h| h.is_public).collect();
    habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(habits.into_iter().map(PublicHabitView::from).collect())
}

fn to_view(habit: Habit, today: NaiveDate, window_days: u32) -> HabitView {
    let stats = summarize_at(today, &habit.completed_dates, window_days);
    HabitView { habit, stats }
}

fn owned_habit<'a>(data: &'a AppData, user: &str, id: Uuid) -> Result<&'a Habit, AppError> {
    data.habits
        .get(&id)
        .filter(|habit| habit.owner == user)
        .ok_or_else(|| AppError::not_found("Habit not found"))
}

// The in-memory entry is restored if the write fails.
async fn store_habit(
    state: &AppState,
    data: &mut AppData,
    id: Uuid,
    next: Option<Habit>,
) -> Result<(), AppError> {
    let previous = match next {
        Some(habit) => data.habits.insert(id, habit),
        None => data.habits.remove(&id),
    };

    if let Err(err) = persist_data(&state.data_path, data).await {
        match previous {
            Some(habit) => data.habits.insert(id, habit),
            None => data.habits.remove(&id),
        };
        return Err(err);
    }
    Ok(())
}

fn resolve_window(state: &AppState, requested: Option<u32>) -> Result<u32, AppError> {
    match requested {
        None => Ok(state.window_days),
        Some(window) if window_in_range(window) => Ok(window),
        Some(_) => Err(AppError::bad_request(format!(
            "window must be between 1 and {MAX_WINDOW_DAYS} days"
        ))),
    }
}

fn required_name(name: Option<&str>) -> Result<String, AppError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError::bad_request("Please include a habit name")),
    }
}

fn parse_frequency(frequency: Option<&str>) -> Result<Option<Frequency>, AppError> {
    frequency
        .map(|value| {
            Frequency::parse(value)
                .ok_or_else(|| AppError::bad_request("frequency must be one of daily, weekly, custom"))
        })
        .transpose()
}
