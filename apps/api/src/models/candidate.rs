use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A candidate profile as stored by the recruitment backend.
/// Skills and experience are filled in server-side by resume parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume: String,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    /// Years of experience.
    #[serde(default)]
    pub experience: Option<i32>,
    #[serde(default)]
    pub match_scores: Option<Value>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
