//! Answer evaluation: a pluggable, trait-based seam between the interview
//! controller and whatever scores an answer.
//!
//! Default: `HttpEvaluator`, which posts to the recruitment backend's
//! `/evaluate_interview` endpoint. Tests swap in scripted evaluators.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend_client::{BackendError, RecruitmentClient, EVALUATE_PATH};
use crate::interview::session::QuestionCategory;

/// Everything the evaluator needs to score one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRequest {
    pub match_id: i64,
    pub question: String,
    pub answer: String,
    pub question_type: QuestionCategory,
    /// Tells the backend this answer closes the interview.
    pub is_final_question: bool,
}

/// Result of evaluating one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub score: f64, // 0.0 – 1.0
    pub feedback: String,
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Feedback, BackendError>;
}

pub struct HttpEvaluator(pub RecruitmentClient);

#[async_trait]
impl Evaluator for HttpEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Feedback, BackendError> {
        let feedback: Feedback = self.0.post_json(EVALUATE_PATH, request).await?;
        Ok(clamp_score(feedback))
    }
}

fn clamp_score(mut feedback: Feedback) -> Feedback {
    if !(0.0..=1.0).contains(&feedback.score) {
        warn!(
            "Evaluator returned out-of-range score {}, clamping to [0, 1]",
            feedback.score
        );
        feedback.score = if feedback.score.is_nan() {
            0.0
        } else {
            feedback.score.clamp(0.0, 1.0)
        };
    }
    feedback
}
