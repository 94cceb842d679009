//! HTTP server for neuroplayd.

use crate::config::DaemonConfig;
use crate::dispatcher::{self};
use crate::intake::IntakeQueue;
use crate::orchestrator::CompletionOrchestrator;
use crate::repos::{
    InMemoryAchievementRepository, InMemoryGameRepository, InMemoryStudentRepository,
    StudentRepository,
};
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Application state shared across handlers.
pub struct AppState {
    pub queue: Arc<IntakeQueue>,
    pub students: Arc<InMemoryStudentRepository>,
    pub start_time: Instant,
    pub workers: usize,
}

/// Fully wired daemon: shared state plus the running worker pool.
pub struct Daemon {
    pub state: Arc<AppState>,
    pub workers: Vec<JoinHandle<()>>,
    pub sweeper: JoinHandle<()>,
}

/// Construct the queue, repositories, orchestrator and worker pool from
/// config. The in-memory adapters are the default storage; real adapters
/// plug in through the repository traits.
pub fn build_daemon(config: &DaemonConfig) -> Daemon {
    let students = Arc::new(InMemoryStudentRepository::new());
    let games = Arc::new(InMemoryGameRepository::new());
    let achievements = Arc::new(InMemoryAchievementRepository::new());

    // The orchestrator borrows the student store through its port; the
    // concrete handle stays in AppState for the registration routes.
    let students_port: Arc<dyn StudentRepository> = students.clone();
    let orchestrator = Arc::new(CompletionOrchestrator::new(
        students_port,
        games,
        achievements,
    ));

    let (queue, rx) = IntakeQueue::new(
        config.intake.queue_capacity,
        config.intake.pending_ttl(),
        config.intake.result_ttl(),
        config.worker.max_attempts,
    );
    let queue = Arc::new(queue);

    let workers = dispatcher::spawn_workers(
        config.worker.workers,
        Arc::clone(&queue),
        rx,
        orchestrator,
        config.worker.retry_policy(),
    );

    let sweeper = spawn_sweeper(Arc::clone(&queue), config.intake.sweep_interval());

    Daemon {
        state: Arc::new(AppState {
            queue,
            students,
            start_time: Instant::now(),
            workers: config.worker.workers,
        }),
        workers,
        sweeper,
    }
}

/// Periodically drop expired jobs and results.
fn spawn_sweeper(queue: Arc<IntakeQueue>, interval: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let purged = queue.purge_expired().await;
            if purged > 0 {
                debug!(purged, "Swept expired jobs");
            }
        }
    })
}

/// Assemble the router over the shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::gameplay_routes())
        .merge(routes::student_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until shutdown.
pub async fn run(config: DaemonConfig) -> Result<()> {
    let daemon = build_daemon(&config);
    let app = build_router(Arc::clone(&daemon.state));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;

    daemon.sweeper.abort();
    Ok(())
}
