use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::screening::{Match, MatchStatus};
use crate::screenings::cache::ScreeningSnapshot;

const TOP_MATCH_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct MatchHighlight {
    pub match_id: i64,
    pub job_title: Option<String>,
    pub candidate_name: Option<String>,
    pub match_score: f64,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub active_jobs: usize,
    pub candidates: usize,
    pub total_matches: usize,
    pub pending_interviews: usize,
    pub completed_interviews: usize,
    /// Mean match score; 0.0 when there are no matches.
    pub average_match_score: f64,
    pub top_matches: Vec<MatchHighlight>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

pub fn compute_dashboard(snapshot: &ScreeningSnapshot) -> DashboardSummary {
    let matches = &snapshot.matches;

    let pending_interviews = matches
        .iter()
        .filter(|m| m.status == MatchStatus::PendingInterview)
        .count();
    let completed_interviews = matches
        .iter()
        .filter(|m| m.status == MatchStatus::InterviewCompleted)
        .count();

    let average_match_score = if matches.is_empty() {
        0.0
    } else {
        matches.iter().map(|m| m.match_score).sum::<f64>() / matches.len() as f64
    };

    let mut ranked: Vec<&Match> = matches.iter().collect();
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    let top_matches = ranked
        .into_iter()
        .take(TOP_MATCH_COUNT)
        .map(|m| highlight(m, snapshot))
        .collect();

    DashboardSummary {
        active_jobs: snapshot.jobs.len(),
        candidates: snapshot.candidates.len(),
        total_matches: matches.len(),
        pending_interviews,
        completed_interviews,
        average_match_score,
        top_matches,
        refreshed_at: snapshot.refreshed_at,
    }
}

/// Resolves display names from the embedded records, falling back to the
/// snapshot's job and candidate lists.
fn highlight(m: &Match, snapshot: &ScreeningSnapshot) -> MatchHighlight {
    let job_title = m
        .job
        .as_ref()
        .map(|j| j.title.clone())
        .or_else(|| {
            snapshot
                .jobs
                .iter()
                .find(|j| j.id == m.job_id)
                .map(|j| j.title.clone())
        });
    let candidate_name = m
        .candidate
        .as_ref()
        .map(|c| c.name.clone())
        .or_else(|| {
            snapshot
                .candidates
                .iter()
                .find(|c| c.id == m.candidate_id)
                .map(|c| c.name.clone())
        });

    MatchHighlight {
        match_id: m.id,
        job_title,
        candidate_name,
        match_score: m.match_score,
        status: m.status.clone(),
    }
}
