// Interview sessions: one candidate answering a match's technical questions,
// then its behavioral questions, with every answer scored by the backend evaluator.
// `session` and `controller` hold the state machine and never log; `registry`
// is the caller that owns live sessions and enforces one submit at a time.

pub mod controller;
pub mod evaluator;
pub mod handlers;
pub mod registry;
pub mod session;

use thiserror::Error;

use crate::backend_client::BackendError;

/// Why a match cannot host an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejection {
    #[error("interview questions missing")]
    QuestionsMissing,

    #[error("no technical questions")]
    NoTechnicalQuestions,
}

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Invalid interview state: {0}")]
    InvalidInterviewState(StartRejection),

    #[error("Answer must not be empty")]
    EmptyAnswer,

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(#[source] BackendError),

    #[error("Interview session not found")]
    SessionNotFound,

    #[error("An answer for this session is already being evaluated")]
    SessionBusy,

    #[error("Interview session was cancelled")]
    SessionCancelled,
}
