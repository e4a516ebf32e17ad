//! Axum route handlers for jobs, candidates, matches and the dashboard.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::screening::Match;
use crate::screenings::cache::ScreeningSnapshot;
use crate::screenings::dashboard::{compute_dashboard, DashboardSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub job_id: i64,
    pub candidate_id: i64,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.screenings.jobs().await)
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(State(state): State<AppState>) -> Json<Vec<Candidate>> {
    Json(state.screenings.candidates().await)
}

/// GET /api/v1/matches
pub async fn handle_list_matches(State(state): State<AppState>) -> Json<Vec<Match>> {
    Json(state.screenings.matches().await)
}

/// POST /api/v1/matches
///
/// Scores one (job, candidate) pair on the backend and adds it to the snapshot.
pub async fn handle_create_match(
    State(state): State<AppState>,
    payload: Result<Json<CreateMatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let Json(request) = payload?;
    let created = state
        .backend
        .create_match(request.job_id, request.candidate_id)
        .await?;
    info!(
        "Match {} created for job {} / candidate {} (score {:.2})",
        created.id, created.job_id, created.candidate_id, created.match_score
    );
    state.screenings.upsert_matches(vec![created.clone()]).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/matches/auto-screen
///
/// The screened list supersedes every match held before.
pub async fn handle_auto_screen(
    State(state): State<AppState>,
) -> Result<Json<Vec<Match>>, AppError> {
    let screened = state.backend.auto_screen().await?;
    info!("Auto-screening produced {} matches", screened.len());
    state.screenings.replace_matches(screened.clone()).await;
    Ok(Json(screened))
}

/// POST /api/v1/matches/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<ScreeningSnapshot>, AppError> {
    let snapshot = state.screenings.refresh(&state.backend).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    let snapshot = state.screenings.snapshot().await;
    Json(compute_dashboard(&snapshot))
}
