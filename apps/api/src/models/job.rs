use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A job description as stored by the recruitment backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub standardized_role: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
