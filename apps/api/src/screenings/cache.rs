use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backend_client::{BackendError, RecruitmentClient};
use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::screening::Match;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningSnapshot {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
    pub matches: Vec<Match>,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Cheaply cloneable handle to the shared snapshot.
#[derive(Clone, Default)]
pub struct ScreeningCache {
    inner: Arc<RwLock<ScreeningSnapshot>>,
}

impl ScreeningCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> ScreeningSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.inner.read().await.jobs.clone()
    }

    pub async fn candidates(&self) -> Vec<Candidate> {
        self.inner.read().await.candidates.clone()
    }

    pub async fn matches(&self) -> Vec<Match> {
        self.inner.read().await.matches.clone()
    }

    pub async fn find_match(&self, id: i64) -> Option<Match> {
        self.inner
            .read()
            .await
            .matches
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub async fn replace(&self, snapshot: ScreeningSnapshot) {
        *self.inner.write().await = snapshot;
    }

    /// Fetches all three lists concurrently and swaps them in together.
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(
        &self,
        client: &RecruitmentClient,
    ) -> Result<ScreeningSnapshot, BackendError> {
        let (jobs, candidates, matches) = tokio::try_join!(
            client.list_jobs(),
            client.list_candidates(),
            client.list_matches()
        )?;

        let snapshot = ScreeningSnapshot {
            jobs,
            candidates,
            matches,
            refreshed_at: Some(Utc::now()),
        };
        debug!(
            "Screening snapshot refreshed: {} jobs, {} candidates, {} matches",
            snapshot.jobs.len(),
            snapshot.candidates.len(),
            snapshot.matches.len()
        );
        self.replace(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Swaps in a fresh match list, leaving jobs and candidates alone.
    pub async fn replace_matches(&self, matches: Vec<Match>) {
        self.inner.write().await.matches = matches;
    }

    /// Inserts new matches, replacing any existing entry with the same id.
    /// New matches go to the front, the way the screening list shows them.
    pub async fn upsert_matches(&self, incoming: Vec<Match>) {
        let mut snapshot = self.inner.write().await;
        snapshot
            .matches
            .retain(|existing| !incoming.iter().any(|m| m.id == existing.id));
        let mut merged = incoming;
        merged.append(&mut snapshot.matches);
        snapshot.matches = merged;
    }
}

/// Spawns the periodic refresher. It only ever touches the snapshot.
pub fn spawn_refresher(
    cache: ScreeningCache,
    client: RecruitmentClient,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately; startup already refreshed
        ticker.tick().await;
        info!("Screening refresher running every {}s", period.as_secs());

        loop {
            ticker.tick().await;
            if let Err(e) = cache.refresh(&client).await {
                warn!("Periodic screening refresh failed: {e}");
            }
        }
    })
}
