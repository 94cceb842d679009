//! Worker dispatcher.
//!
//! A pool of workers pulls job ids from the shared channel, runs each
//! through the orchestrator under a per-try timeout, and retries transient
//! failures with exponential backoff. Validation and anti-cheat failures
//! never enter the retry loop.

use crate::intake::IntakeQueue;
use crate::orchestrator::CompletionOrchestrator;
use neuroplay_common::PipelineError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Retry behavior for one job.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total tries per job, including the first.
    pub max_attempts: u32,
    /// Backoff is base * 2^attempt.
    pub base_delay: Duration,
    /// Bound on a single try; overruns count as transient failures.
    pub job_timeout: Duration,
}

/// Spawn the worker pool. Workers exit when the channel closes.
pub fn spawn_workers(
    workers: usize,
    queue: Arc<IntakeQueue>,
    rx: mpsc::Receiver<String>,
    orchestrator: Arc<CompletionOrchestrator>,
    policy: RetryPolicy,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));

    (0..workers)
        .map(|worker_id| {
            let rx = Arc::clone(&rx);
            let queue = Arc::clone(&queue);
            let orchestrator = Arc::clone(&orchestrator);
            let policy = policy.clone();

            tokio::spawn(async move {
                info!(worker_id, "Completion worker started");
                loop {
                    let job_id = { rx.lock().await.recv().await };
                    match job_id {
                        Some(job_id) => {
                            process_job(&queue, &orchestrator, &policy, &job_id).await;
                        }
                        None => {
                            info!(worker_id, "Queue closed, worker stopping");
                            break;
                        }
                    }
                }
            })
        })
        .collect()
}

/// Run one job to a terminal state: completed, failed, or silently dropped
/// when its TTL expired before processing.
pub async fn process_job(
    queue: &IntakeQueue,
    orchestrator: &CompletionOrchestrator,
    policy: &RetryPolicy,
    job_id: &str,
) {
    loop {
        let Some(job) = queue.begin_attempt(job_id).await else {
            warn!(job_id, "Job expired or already terminal, skipping");
            return;
        };

        let last_error = match timeout(policy.job_timeout, orchestrator.execute(&job.payload))
            .await
        {
            Ok(Ok(result)) => {
                info!(job_id, attempts = job.attempts, "Job completed");
                queue.complete(job_id, result).await;
                return;
            }
            Ok(Err(err)) if !err.is_retryable() => {
                warn!(job_id, "Job rejected: {err}");
                queue.fail(job_id, err.to_string()).await;
                return;
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("processing exceeded {:?}", policy.job_timeout),
        };

        if job.can_retry() {
            let delay = job.backoff_delay(policy.base_delay);
            warn!(
                job_id,
                attempt = job.attempts,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying: {last_error}"
            );
            tokio::time::sleep(delay).await;
        } else {
            let err = PipelineError::RetriesExhausted {
                attempts: job.attempts,
                last_error,
            };
            error!(job_id, "Job failed permanently: {err}");
            queue.fail(job_id, err.to_string()).await;
            return;
        }
    }
}
