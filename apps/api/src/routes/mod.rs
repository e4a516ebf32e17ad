pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers as interviews;
use crate::screenings::handlers as screenings;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening snapshot
        .route("/api/v1/jobs", get(screenings::handle_list_jobs))
        .route("/api/v1/candidates", get(screenings::handle_list_candidates))
        .route(
            "/api/v1/matches",
            get(screenings::handle_list_matches).post(screenings::handle_create_match),
        )
        .route(
            "/api/v1/matches/auto-screen",
            post(screenings::handle_auto_screen),
        )
        .route("/api/v1/matches/refresh", post(screenings::handle_refresh))
        .route("/api/v1/dashboard", get(screenings::handle_dashboard))
        // Interview sessions
        .route("/api/v1/interviews", post(interviews::handle_start_interview))
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handle_get_interview).delete(interviews::handle_cancel_interview),
        )
        .route(
            "/api/v1/interviews/:id/draft",
            put(interviews::handle_save_draft),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(interviews::handle_submit_answer),
        )
        .with_state(state)
}
