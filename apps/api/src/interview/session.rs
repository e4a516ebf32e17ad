use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interview::evaluator::Feedback;
use crate::interview::{InterviewError, StartRejection};
use crate::models::screening::{InterviewQuestions, Match};

/// The two fixed question categories, always asked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Behavioral,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Technical => "technical",
            QuestionCategory::Behavioral => "behavioral",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a started interview. A match with no session is "not started";
/// `Completed` and `Cancelled` are terminal and have no transitions out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InterviewState {
    AwaitingAnswer {
        category: QuestionCategory,
        index: usize,
    },
    Completed,
    Cancelled,
}

/// One candidate's progress through a match's questions.
///
/// The question lists are copied out of the match at start, so `category`
/// and `index` always point at an existing question for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    match_id: i64,
    questions: InterviewQuestions,
    category: QuestionCategory,
    index: usize,
    /// In-progress answer text.
    pub answer: String,
    /// Evaluation of the previous answer, if any.
    pub feedback: Option<Feedback>,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session on the first technical question of `screening`.
    pub fn start(screening: &Match) -> Result<Self, InterviewError> {
        let questions = screening
            .interview_questions
            .as_ref()
            .ok_or(InterviewError::InvalidInterviewState(
                StartRejection::QuestionsMissing,
            ))?;

        if questions.technical.is_empty() {
            return Err(InterviewError::InvalidInterviewState(
                StartRejection::NoTechnicalQuestions,
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            match_id: screening.id,
            questions: questions.clone(),
            category: QuestionCategory::Technical,
            index: 0,
            answer: String::new(),
            feedback: None,
            started_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn match_id(&self) -> i64 {
        self.match_id
    }

    pub fn category(&self) -> QuestionCategory {
        self.category
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> InterviewState {
        InterviewState::AwaitingAnswer {
            category: self.category,
            index: self.index,
        }
    }

    /// Number of questions in `category`.
    pub fn question_count(&self, category: QuestionCategory) -> usize {
        self.list(category).len()
    }

    pub fn question(&self) -> &str {
        &self.list(self.category)[self.index]
    }

    /// True when submitting now closes the interview. Presentation labels the
    /// action "Complete Interview" instead of "Next Question" in that case.
    pub fn is_final_question(&self) -> bool {
        let technical = self.questions.technical.len();
        let behavioral = self.questions.behavioral.len();
        match self.category {
            QuestionCategory::Technical => self.index == technical - 1 && behavioral == 0,
            QuestionCategory::Behavioral => self.index == behavioral - 1,
        }
    }

    pub fn action_label(&self) -> &'static str {
        if self.is_final_question() {
            "Complete Interview"
        } else {
            "Next Question"
        }
    }

    /// Position of the question that follows the current one, or `None`
    /// once the last question of the last non-empty category is reached.
    pub(crate) fn next_position(&self) -> Option<(QuestionCategory, usize)> {
        let technical = self.questions.technical.len();
        let behavioral = self.questions.behavioral.len();
        match self.category {
            QuestionCategory::Technical if self.index + 1 < technical => {
                Some((QuestionCategory::Technical, self.index + 1))
            }
            QuestionCategory::Technical if behavioral > 0 => {
                Some((QuestionCategory::Behavioral, 0))
            }
            QuestionCategory::Behavioral if self.index + 1 < behavioral => {
                Some((QuestionCategory::Behavioral, self.index + 1))
            }
            _ => None,
        }
    }

    /// The session positioned on the next question with `feedback` attached
    /// and the answer cleared.
    pub(crate) fn advanced_to(
        &self,
        category: QuestionCategory,
        index: usize,
        feedback: Feedback,
    ) -> Self {
        debug_assert!(index < self.list(category).len());
        Self {
            category,
            index,
            answer: String::new(),
            feedback: Some(feedback),
            ..self.clone()
        }
    }

    fn list(&self, category: QuestionCategory) -> &[String] {
        match category {
            QuestionCategory::Technical => &self.questions.technical,
            QuestionCategory::Behavioral => &self.questions.behavioral,
        }
    }
}
