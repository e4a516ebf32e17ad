use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::candidate::Candidate;
use crate::models::job::Job;

const PENDING_INTERVIEW: &str = "Pending Interview";
const INTERVIEW_COMPLETED: &str = "Interview Completed";

/// Lifecycle status of a match. The backend sends free text; the two
/// values the gateway cares about are recognised, everything else is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchStatus {
    #[default]
    PendingInterview,
    InterviewCompleted,
    Other(String),
}

impl From<String> for MatchStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            PENDING_INTERVIEW => MatchStatus::PendingInterview,
            INTERVIEW_COMPLETED => MatchStatus::InterviewCompleted,
            _ => MatchStatus::Other(raw),
        }
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::PendingInterview => PENDING_INTERVIEW.to_string(),
            MatchStatus::InterviewCompleted => INTERVIEW_COMPLETED.to_string(),
            MatchStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::PendingInterview => f.write_str(PENDING_INTERVIEW),
            MatchStatus::InterviewCompleted => f.write_str(INTERVIEW_COMPLETED),
            MatchStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// The two ordered question lists generated for a match.
/// A list missing from the payload reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestions {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub behavioral: Vec<String>,
}

/// Skill overlap computed by the screening agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_skills: Vec<String>,
}

/// A scored (job, candidate) pairing, a.k.a. a screening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: i64,
    pub job_id: i64,
    pub candidate_id: i64,
    /// 0.0 – 1.0; an unscored match reads as 0.
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: MatchStatus,
    #[serde(default)]
    pub interview_questions: Option<InterviewQuestions>,
    #[serde(default)]
    pub skill_match_details: Option<SkillMatchDetails>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub job: Option<Job>,
    #[serde(default)]
    pub candidate: Option<Candidate>,
}

/// Nullable backend columns arrive as `null`; treat that like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
