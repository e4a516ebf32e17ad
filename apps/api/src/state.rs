use std::sync::Arc;

use crate::backend_client::RecruitmentClient;
use crate::config::Config;
use crate::interview::registry::SessionRegistry;
use crate::screenings::cache::ScreeningCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub backend: RecruitmentClient,
    /// Jobs, candidates and matches mirrored from the backend.
    pub screenings: ScreeningCache,
    /// Live interview sessions. Evaluation goes through the registry's controller.
    pub interviews: Arc<SessionRegistry>,
    pub config: Config,
}
