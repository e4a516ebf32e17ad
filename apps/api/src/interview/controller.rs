//! Interview Session Controller: the state machine driving one session.
//!
//! `start` → AwaitingAnswer(technical, 0); `submit_answer` either advances
//! to the next question or reports completion; `cancel` drops the session.
//! The controller never mutates the session it is handed: a failed submit
//! leaves the caller holding the exact same value to retry with.

use std::sync::Arc;
use std::time::Duration;

use crate::backend_client::BackendError;
use crate::interview::evaluator::{EvaluationRequest, Evaluator, Feedback};
use crate::interview::session::Session;
use crate::interview::InterviewError;
use crate::models::screening::Match;

/// Result of a successful submit.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Positioned on the next question, with the answer cleared and feedback set.
    Advanced(Session),
    /// The final answer was acknowledged; the session is over.
    Completed { match_id: i64, feedback: Feedback },
}

#[derive(Clone)]
pub struct InterviewController {
    evaluator: Arc<dyn Evaluator>,
    timeout: Duration,
}

impl InterviewController {
    pub fn new(evaluator: Arc<dyn Evaluator>, timeout: Duration) -> Self {
        Self { evaluator, timeout }
    }

    pub fn start(&self, screening: &Match) -> Result<Session, InterviewError> {
        Session::start(screening)
    }

    pub async fn submit_answer(
        &self,
        session: &Session,
        answer: &str,
    ) -> Result<SubmitOutcome, InterviewError> {
        if answer.trim().is_empty() {
            return Err(InterviewError::EmptyAnswer);
        }

        let request = EvaluationRequest {
            match_id: session.match_id(),
            question: session.question().to_string(),
            answer: answer.to_string(),
            question_type: session.category(),
            is_final_question: session.is_final_question(),
        };

        let feedback = tokio::time::timeout(self.timeout, self.evaluator.evaluate(&request))
            .await
            .map_err(|_| InterviewError::EvaluationFailed(BackendError::Timeout(self.timeout)))?
            .map_err(InterviewError::EvaluationFailed)?;

        Ok(match session.next_position() {
            Some((category, index)) => {
                SubmitOutcome::Advanced(session.advanced_to(category, index, feedback))
            }
            None => SubmitOutcome::Completed {
                match_id: session.match_id(),
                feedback,
            },
        })
    }

    /// Discards the session. No remote call is made.
    pub fn cancel(&self, session: Session) {
        drop(session);
    }
}
