//! Axum route handlers for the Interview API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::controller::SubmitOutcome;
use crate::interview::evaluator::Feedback;
use crate::interview::session::{InterviewState, QuestionCategory, Session};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub match_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitAnswerRequest {
    /// Falls back to the saved draft when omitted.
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub match_id: i64,
    #[serde(flatten)]
    pub state: InterviewState,
    pub question: String,
    pub technical_count: usize,
    pub behavioral_count: usize,
    pub is_final_question: bool,
    pub action_label: &'static str,
    pub answer: String,
    pub feedback: Option<Feedback>,
    pub started_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id(),
            match_id: session.match_id(),
            state: session.state(),
            question: session.question().to_string(),
            technical_count: session.question_count(QuestionCategory::Technical),
            behavioral_count: session.question_count(QuestionCategory::Behavioral),
            is_final_question: session.is_final_question(),
            action_label: session.action_label(),
            answer: session.answer.clone(),
            feedback: session.feedback.clone(),
            started_at: session.started_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    #[serde(flatten)]
    pub state: InterviewState,
    pub feedback: Option<Feedback>,
    /// Next question; absent once the interview is complete.
    pub session: Option<SessionView>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: InterviewState,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Opens a session on the match's first technical question.
/// Unknown matches trigger one snapshot refresh before giving up.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    payload: Result<Json<StartInterviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let Json(request) = payload?;
    let screening = match state.screenings.find_match(request.match_id).await {
        Some(m) => m,
        None => {
            state.screenings.refresh(&state.backend).await?;
            state
                .screenings
                .find_match(request.match_id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("Match {} not found", request.match_id)))?
        }
    };

    let session = state.interviews.open(&screening).await?;
    Ok((StatusCode::CREATED, Json(SessionView::from(&session))))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.interviews.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// PUT /api/v1/interviews/:id/draft
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(request) = payload?;
    let session = state.interviews.save_draft(id, request.answer).await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/v1/interviews/:id/answers
///
/// Evaluates the answer and moves to the next question. On the final
/// question the session is closed and the screening snapshot is refreshed
/// in the background so the match picks up its new status.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let Json(request) = payload?;
    let response = match state.interviews.submit(id, request.answer).await? {
        SubmitOutcome::Advanced(session) => SubmitAnswerResponse {
            state: session.state(),
            feedback: session.feedback.clone(),
            session: Some(SessionView::from(&session)),
        },
        SubmitOutcome::Completed { match_id, feedback } => {
            let screenings = state.screenings.clone();
            let backend = state.backend.clone();
            tokio::spawn(async move {
                if let Err(e) = screenings.refresh(&backend).await {
                    warn!("Snapshot refresh after interview on match {match_id} failed: {e}");
                }
            });
            SubmitAnswerResponse {
                state: InterviewState::Completed,
                feedback: Some(feedback),
                session: None,
            }
        }
    };

    Ok(Json(response))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_cancel_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, AppError> {
    state.interviews.cancel(id).await?;
    Ok(Json(CancelResponse {
        session_id: id,
        state: InterviewState::Cancelled,
    }))
}
