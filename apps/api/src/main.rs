mod backend_client;
mod config;
mod errors;
mod interview;
mod models;
mod routes;
mod screenings;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::RecruitmentClient;
use crate::config::Config;
use crate::interview::controller::InterviewController;
use crate::interview::evaluator::HttpEvaluator;
use crate::interview::registry::{spawn_session_sweeper, SessionRegistry};
use crate::routes::build_router;
use crate::screenings::cache::{spawn_refresher, ScreeningCache};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screening gateway v{}", env!("CARGO_PKG_VERSION"));

    // The client timeout sits just above the evaluation bound so the
    // controller's own timeout is the one callers observe.
    let backend = RecruitmentClient::new(
        &config.backend_url,
        config.evaluation_timeout + Duration::from_secs(1),
    )?
    .with_screening_timeout(config.screening_timeout);
    info!("Recruitment backend client initialized ({})", backend.base_url());

    // Prime the snapshot; the gateway still starts if the backend is down.
    let screenings = ScreeningCache::new();
    match screenings.refresh(&backend).await {
        Ok(snapshot) => info!(
            "Initial snapshot: {} jobs, {} candidates, {} matches",
            snapshot.jobs.len(),
            snapshot.candidates.len(),
            snapshot.matches.len()
        ),
        Err(e) => warn!("Initial snapshot refresh failed, serving empty lists: {e}"),
    }
    spawn_refresher(screenings.clone(), backend.clone(), config.refresh_interval);

    let controller = InterviewController::new(
        Arc::new(HttpEvaluator(backend.clone())),
        config.evaluation_timeout,
    );
    info!(
        "Interview controller initialized (evaluation timeout {}s)",
        config.evaluation_timeout.as_secs()
    );

    let interviews = Arc::new(SessionRegistry::new(controller));
    spawn_session_sweeper(interviews.clone(), config.session_idle_timeout);

    let state = AppState {
        backend,
        screenings,
        interviews,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
