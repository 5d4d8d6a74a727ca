use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/habits/public", get(handlers::public_habits))
        .route(
            "/api/users/:user/habits",
            get(handlers::list_habits).post(handlers::create_habit),
        )
        .route(
            "/api/users/:user/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/users/:user/habits/:id/complete", put(handlers::toggle_complete))
        .route("/api/users/:user/habits/:id/history", get(handlers::get_history))
        .with_state(state)
}
