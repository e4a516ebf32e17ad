//! Session Registry: owns every live interview session.
//!
//! Each session has exactly one owner slot. A submit marks the slot busy and
//! hands the remote call to a spawned task that re-acquires the lock to apply
//! the result; a second submit against a busy slot is rejected, never queued.
//! Cancelling a busy slot is deferred until its in-flight call lands, and
//! that call's result is thrown away. Idle slots expire after a configurable
//! period of inactivity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::interview::controller::{InterviewController, SubmitOutcome};
use crate::interview::session::Session;
use crate::interview::InterviewError;
use crate::models::screening::Match;

const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

type Slots = Arc<Mutex<HashMap<Uuid, Slot>>>;

struct Slot {
    session: Session,
    busy: bool,
    cancel_requested: bool,
    last_activity: Instant,
}

pub struct SessionRegistry {
    controller: InterviewController,
    slots: Slots,
}

impl SessionRegistry {
    pub fn new(controller: InterviewController) -> Self {
        Self {
            controller,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn open(&self, screening: &Match) -> Result<Session, InterviewError> {
        let session = self.controller.start(screening)?;
        info!(
            "Interview session {} opened for match {}",
            session.id(),
            screening.id
        );

        self.slots.lock().await.insert(
            session.id(),
            Slot {
                session: session.clone(),
                busy: false,
                cancel_requested: false,
                last_activity: Instant::now(),
            },
        );
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, InterviewError> {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(&id) {
            Some(slot) if !slot.cancel_requested => {
                slot.last_activity = Instant::now();
                Ok(slot.session.clone())
            }
            _ => Err(InterviewError::SessionNotFound),
        }
    }

    /// Stores the in-progress answer text.
    pub async fn save_draft(&self, id: Uuid, answer: String) -> Result<Session, InterviewError> {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(&id) {
            Some(slot) if !slot.cancel_requested => {
                slot.session.answer = answer;
                slot.last_activity = Instant::now();
                Ok(slot.session.clone())
            }
            _ => Err(InterviewError::SessionNotFound),
        }
    }

    /// Submits `answer`, or the saved draft when `answer` is `None`.
    ///
    /// The evaluation runs on its own task, so the slot is settled even when
    /// the caller's future is dropped mid-flight.
    pub async fn submit(
        &self,
        id: Uuid,
        answer: Option<String>,
    ) -> Result<SubmitOutcome, InterviewError> {
        let (session, answer) = {
            let mut slots = self.slots.lock().await;
            let slot = match slots.get_mut(&id) {
                Some(slot) if !slot.cancel_requested => slot,
                _ => return Err(InterviewError::SessionNotFound),
            };
            if slot.busy {
                debug!("Rejecting submit for session {id}: evaluation in flight");
                return Err(InterviewError::SessionBusy);
            }
            slot.busy = true;
            slot.last_activity = Instant::now();
            let answer = answer.unwrap_or_else(|| slot.session.answer.clone());
            (slot.session.clone(), answer)
        };

        let controller = self.controller.clone();
        let slots = self.slots.clone();
        let evaluation = tokio::spawn(async move {
            let result = controller.submit_answer(&session, &answer).await;
            settle(&slots, id, result).await
        });

        match evaluation.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Evaluation task for session {id} died: {e}");
                if let Some(slot) = self.slots.lock().await.get_mut(&id) {
                    slot.busy = false;
                }
                match e.try_into_panic() {
                    Ok(payload) => std::panic::resume_unwind(payload),
                    Err(_) => Err(InterviewError::SessionCancelled),
                }
            }
        }
    }

    /// Cancels a session. Idle sessions are dropped at once; a session with a
    /// submit in flight is dropped when that submit returns.
    pub async fn cancel(&self, id: Uuid) -> Result<(), InterviewError> {
        let mut slots = self.slots.lock().await;
        let busy = match slots.get_mut(&id) {
            Some(slot) if !slot.cancel_requested => {
                slot.cancel_requested = true;
                slot.busy
            }
            _ => return Err(InterviewError::SessionNotFound),
        };

        if busy {
            info!("Interview session {id} will be cancelled once its evaluation returns");
        } else if let Some(slot) = slots.remove(&id) {
            self.controller.cancel(slot.session);
            info!("Interview session {id} cancelled");
        }
        Ok(())
    }

    /// Drops sessions untouched for at least `max_idle`. Slots with an
    /// evaluation in flight are left to their submit. Returns how many went.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|id, slot| {
            let expired = !slot.busy && slot.last_activity.elapsed() >= max_idle;
            if expired {
                debug!(
                    "Interview session {id} expired after {}s idle",
                    max_idle.as_secs()
                );
            }
            !expired
        });
        before - slots.len()
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

/// Applies an evaluation result to the slot it was taken from.
async fn settle(
    slots: &Mutex<HashMap<Uuid, Slot>>,
    id: Uuid,
    result: Result<SubmitOutcome, InterviewError>,
) -> Result<SubmitOutcome, InterviewError> {
    let mut slots = slots.lock().await;
    let Some(slot) = slots.get_mut(&id) else {
        return Err(InterviewError::SessionNotFound);
    };

    if slot.cancel_requested {
        slots.remove(&id);
        info!("Interview session {id} cancelled during evaluation; result discarded");
        return Err(InterviewError::SessionCancelled);
    }

    slot.busy = false;
    slot.last_activity = Instant::now();
    match result {
        Ok(SubmitOutcome::Advanced(next)) => {
            debug!(
                "Session {id} advanced to {} question {}",
                next.category(),
                next.index()
            );
            slot.session = next.clone();
            Ok(SubmitOutcome::Advanced(next))
        }
        Ok(completed @ SubmitOutcome::Completed { .. }) => {
            slots.remove(&id);
            info!("Interview session {id} completed");
            Ok(completed)
        }
        Err(e) => {
            if let InterviewError::EvaluationFailed(cause) = &e {
                warn!("Evaluation failed for session {id}: {cause}");
            }
            Err(e)
        }
    }
}

/// Spawns the task that expires sessions idle for `max_idle`.
pub fn spawn_session_sweeper(
    registry: Arc<SessionRegistry>,
    max_idle: Duration,
) -> JoinHandle<()> {
    let period = max_idle.min(MAX_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        info!(
            "Session sweeper running every {}s (idle limit {}s)",
            period.as_secs(),
            max_idle.as_secs()
        );

        loop {
            ticker.tick().await;
            let expired = registry.sweep_idle(max_idle).await;
            if expired > 0 {
                info!("Expired {expired} idle interview sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::backend_client::BackendError;
    use crate::interview::controller::tests::ScriptedEvaluator;
    use crate::interview::evaluator::{EvaluationRequest, Evaluator, Feedback};
    use crate::interview::session::tests::screening;
    use crate::interview::session::QuestionCategory;

    /// Holds every evaluation until `release` is notified.
    #[derive(Default)]
    struct GatedEvaluator {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Evaluator for GatedEvaluator {
        async fn evaluate(&self, _request: &EvaluationRequest) -> Result<Feedback, BackendError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Feedback {
                score: 0.9,
                feedback: "released".to_string(),
            })
        }
    }

    fn registry(evaluator: Arc<dyn Evaluator>) -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(InterviewController::new(
            evaluator,
            Duration::from_secs(30),
        )))
    }

    #[tokio::test]
    async fn test_open_and_walk_to_completion() {
        let registry = registry(Arc::new(ScriptedEvaluator::default()));
        let session = registry.open(&screening(&["T1", "T2"], &["B1"])).await.unwrap();
        let id = session.id();

        let outcome = registry.submit(id, Some("ans1".into())).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref s) if s.question() == "T2"));
        assert_eq!(registry.get(id).await.unwrap().question(), "T2");

        registry.submit(id, Some("ans2".into())).await.unwrap();
        let current = registry.get(id).await.unwrap();
        assert_eq!(current.category(), QuestionCategory::Behavioral);

        let outcome = registry.submit(id, Some("ans3".into())).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed { match_id: 42, .. }));
        assert!(matches!(
            registry.get(id).await,
            Err(InterviewError::SessionNotFound)
        ));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_open_rejects_match_without_technical_questions() {
        let registry = registry(Arc::new(ScriptedEvaluator::default()));
        let err = registry.open(&screening(&[], &["B1"])).await.unwrap_err();
        assert!(matches!(err, InterviewError::InvalidInterviewState(_)));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_submit_uses_saved_draft() {
        let evaluator = Arc::new(ScriptedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let drafted = registry.save_draft(id, "my draft".into()).await.unwrap();
        assert_eq!(drafted.answer, "my draft");

        registry.submit(id, None).await.unwrap();
        assert_eq!(evaluator.requests()[0].answer, "my draft");
        assert!(registry.get(id).await.unwrap().answer.is_empty());
    }

    #[tokio::test]
    async fn test_empty_answer_leaves_session_untouched() {
        let registry = registry(Arc::new(ScriptedEvaluator::default()));
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let err = registry.submit(id, Some("   ".into())).await.unwrap_err();
        assert!(matches!(err, InterviewError::EmptyAnswer));

        let current = registry.get(id).await.unwrap();
        assert_eq!(current.index(), 0);
        assert_eq!(current.question(), "T1");

        // not left busy
        registry.submit(id, Some("real".into())).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_evaluation_keeps_session_for_retry() {
        let registry = registry(Arc::new(ScriptedEvaluator::failing_first()));
        let id = registry.open(&screening(&["T1", "T2"], &["B1"])).await.unwrap().id();
        registry.save_draft(id, "ans1".into()).await.unwrap();

        let err = registry.submit(id, None).await.unwrap_err();
        assert!(matches!(err, InterviewError::EvaluationFailed(_)));

        let unchanged = registry.get(id).await.unwrap();
        assert_eq!(unchanged.question(), "T1");
        assert_eq!(unchanged.answer, "ans1");

        let outcome = registry.submit(id, None).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref s) if s.question() == "T2"));
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let evaluator = Arc::new(GatedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let first = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans1".into())).await }
        });
        evaluator.entered.notified().await;

        let err = registry.submit(id, Some("ans1 again".into())).await.unwrap_err();
        assert!(matches!(err, InterviewError::SessionBusy));

        evaluator.release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref s) if s.question() == "T2"));
    }

    #[tokio::test]
    async fn test_cancel_idle_session_rejects_later_calls() {
        let evaluator = Arc::new(ScriptedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        registry.cancel(id).await.unwrap();

        assert!(matches!(
            registry.submit(id, Some("ans".into())).await,
            Err(InterviewError::SessionNotFound)
        ));
        assert!(matches!(
            registry.get(id).await,
            Err(InterviewError::SessionNotFound)
        ));
        assert!(matches!(
            registry.cancel(id).await,
            Err(InterviewError::SessionNotFound)
        ));
        assert!(evaluator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_evaluation_discards_result() {
        let evaluator = Arc::new(GatedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let in_flight = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans1".into())).await }
        });
        evaluator.entered.notified().await;

        registry.cancel(id).await.unwrap();
        assert!(matches!(
            registry.get(id).await,
            Err(InterviewError::SessionNotFound)
        ));

        evaluator.release.notify_one();
        let result = in_flight.await.unwrap();
        assert!(matches!(result, Err(InterviewError::SessionCancelled)));
        assert_eq!(registry.len().await, 0);
    }

    /// Yields to the evaluation task until the session shows `question`.
    async fn wait_for_question(registry: &SessionRegistry, id: Uuid, question: &str) {
        for _ in 0..1000 {
            if let Ok(session) = registry.get(id).await {
                if session.question() == question {
                    return;
                }
            }
            tokio::task::yield_now().await;
        }
        panic!("session {id} never reached {question}");
    }

    async fn wait_for_empty(registry: &SessionRegistry) {
        for _ in 0..1000 {
            if registry.len().await == 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("registry still holds sessions");
    }

    #[tokio::test]
    async fn test_dropped_submit_still_settles_the_slot() {
        let evaluator = Arc::new(GatedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &["B1"])).await.unwrap().id();

        let request = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans1".into())).await }
        });
        evaluator.entered.notified().await;
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());

        evaluator.release.notify_one();
        wait_for_question(&registry, id, "T2").await;

        let retry = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans2".into())).await }
        });
        evaluator.entered.notified().await;
        evaluator.release.notify_one();
        let outcome = retry.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(ref s) if s.question() == "B1"));
    }

    #[tokio::test]
    async fn test_cancel_after_dropped_submit_frees_the_slot() {
        let evaluator = Arc::new(GatedEvaluator::default());
        let registry = registry(evaluator.clone());
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let request = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans1".into())).await }
        });
        evaluator.entered.notified().await;
        request.abort();
        let _ = request.await;

        registry.cancel(id).await.unwrap();
        assert_eq!(registry.len().await, 1);

        evaluator.release.notify_one();
        wait_for_empty(&registry).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_only_idle_sessions() {
        let registry = registry(Arc::new(ScriptedEvaluator::default()));
        let stale = registry.open(&screening(&["T1"], &[])).await.unwrap().id();
        let touched = registry.open(&screening(&["T1"], &[])).await.unwrap().id();

        tokio::time::advance(Duration::from_secs(600)).await;
        registry.save_draft(touched, "half an answer".into()).await.unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;

        assert_eq!(registry.sweep_idle(Duration::from_secs(900)).await, 1);
        assert!(matches!(
            registry.get(stale).await,
            Err(InterviewError::SessionNotFound)
        ));
        assert_eq!(registry.get(touched).await.unwrap().answer, "half an answer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_keeps_session_with_evaluation_in_flight() {
        let evaluator = Arc::new(GatedEvaluator::default());
        let registry = Arc::new(SessionRegistry::new(InterviewController::new(
            evaluator.clone(),
            Duration::from_secs(24 * 3600),
        )));
        let id = registry.open(&screening(&["T1", "T2"], &[])).await.unwrap().id();

        let in_flight = tokio::spawn({
            let registry = registry.clone();
            async move { registry.submit(id, Some("ans1".into())).await }
        });
        evaluator.entered.notified().await;

        tokio::time::advance(Duration::from_secs(7200)).await;
        assert_eq!(registry.sweep_idle(Duration::from_secs(60)).await, 0);

        evaluator.release.notify_one();
        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_abandoned_sessions() {
        let registry = registry(Arc::new(ScriptedEvaluator::default()));
        registry.open(&screening(&["T1"], &[])).await.unwrap();

        let sweeper = spawn_session_sweeper(registry.clone(), Duration::from_secs(120));
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(registry.len().await, 0);
        sweeper.abort();
    }
}
