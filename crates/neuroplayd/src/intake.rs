//! Intake queue and result store.
//!
//! The fast client-facing path: validate the submission shape, store a
//! pending job with a TTL, push its id onto the processing channel and
//! acknowledge immediately. Workers mutate the stored job through the
//! claim/complete/fail methods; the polling endpoint reads it back. At
//! most one worker claims a given queued id because ids are delivered
//! through a single consumer channel.

use neuroplay_common::{
    CompletionJob, CompletionResult, GameSession, JobStatus, JobStatusResponse, PipelineError,
    SubmitAck,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

struct StoredJob {
    job: CompletionJob,
    expires_at: Instant,
}

/// Shared queue and job/result table, bounded by TTLs.
pub struct IntakeQueue {
    jobs: Mutex<HashMap<String, StoredJob>>,
    tx: mpsc::Sender<String>,
    pending_ttl: Duration,
    result_ttl: Duration,
    max_attempts: u32,
}

impl IntakeQueue {
    /// Build the queue and hand back the consumer end for the dispatcher.
    pub fn new(
        capacity: usize,
        pending_ttl: Duration,
        result_ttl: Duration,
        max_attempts: u32,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                jobs: Mutex::new(HashMap::new()),
                tx,
                pending_ttl,
                result_ttl,
                max_attempts,
            },
            rx,
        )
    }

    /// Accept a submission: validate its shape, store the pending job and
    /// enqueue it. Returns the acknowledgment for the client without
    /// waiting for processing.
    pub async fn submit(&self, payload: serde_json::Value) -> Result<SubmitAck, PipelineError> {
        // Boundary validation: malformed payloads are a client error here,
        // distinct from an anti-cheat rejection inside the worker.
        let session = GameSession::from_payload(&payload)?;
        let job_id = session.session_id.clone();

        let job = CompletionJob::new(job_id.clone(), payload, self.max_attempts);
        {
            let mut jobs = self.jobs.lock().await;
            jobs.insert(
                job_id.clone(),
                StoredJob {
                    job,
                    expires_at: Instant::now() + self.pending_ttl,
                },
            );
        }

        if let Err(e) = self.tx.try_send(job_id.clone()) {
            // Roll the stored job back: no worker will ever see this id, so
            // leaving it would poll as processing until the TTL fires.
            let mut jobs = self.jobs.lock().await;
            jobs.remove(&job_id);
            warn!("Intake queue saturated: {e}");
            return Err(PipelineError::Storage(format!("intake queue full: {e}")));
        }

        debug!(job_id = %job_id, "Submission enqueued");
        Ok(SubmitAck::processing(job_id))
    }

    /// Observable status for the polling endpoint. Expired entries read as
    /// not found and are dropped on the way.
    pub async fn poll(&self, job_id: &str) -> JobStatusResponse {
        let mut jobs = self.jobs.lock().await;

        let entry = match jobs.get(job_id) {
            Some(entry) if entry.expires_at > Instant::now() => entry,
            Some(_) => {
                jobs.remove(job_id);
                return JobStatusResponse::NotFound {
                    job_id: job_id.to_string(),
                };
            }
            None => {
                return JobStatusResponse::NotFound {
                    job_id: job_id.to_string(),
                }
            }
        };

        match entry.job.status {
            JobStatus::Pending | JobStatus::Processing => JobStatusResponse::Processing {
                job_id: job_id.to_string(),
            },
            JobStatus::Completed => match entry.job.result.clone() {
                Some(result) => JobStatusResponse::Completed {
                    job_id: job_id.to_string(),
                    result,
                },
                // Completed jobs always carry a result; treat a missing one
                // as a failure rather than panicking in the handler.
                None => JobStatusResponse::Failed {
                    job_id: job_id.to_string(),
                    reason: "completed job has no stored result".to_string(),
                },
            },
            JobStatus::Failed => JobStatusResponse::Failed {
                job_id: job_id.to_string(),
                reason: entry
                    .job
                    .failure_reason
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
            },
        }
    }

    /// Claim the job for one processing try. Returns a snapshot with the
    /// attempt already counted, or `None` when the job expired or already
    /// reached a terminal state.
    pub async fn begin_attempt(&self, job_id: &str) -> Option<CompletionJob> {
        let mut jobs = self.jobs.lock().await;
        let entry = jobs.get_mut(job_id)?;
        if entry.expires_at <= Instant::now() || entry.job.is_terminal() {
            return None;
        }
        entry.job.start_attempt();
        Some(entry.job.clone())
    }

    /// Publish the terminal result and open the delivery window.
    pub async fn complete(&self, job_id: &str, result: CompletionResult) {
        let mut jobs = self.jobs.lock().await;
        if let Some(entry) = jobs.get_mut(job_id) {
            entry.job.complete(result);
            entry.expires_at = Instant::now() + self.result_ttl;
        }
    }

    /// Record the terminal failure and open the delivery window.
    pub async fn fail(&self, job_id: &str, reason: String) {
        let mut jobs = self.jobs.lock().await;
        if let Some(entry) = jobs.get_mut(job_id) {
            entry.job.fail(reason);
            entry.expires_at = Instant::now() + self.result_ttl;
        }
    }

    /// Jobs still awaiting a terminal result.
    pub async fn depth(&self) -> usize {
        let jobs = self.jobs.lock().await;
        jobs.values().filter(|e| !e.job.is_terminal()).count()
    }

    /// Drop expired entries. Called periodically by the sweeper task.
    pub async fn purge_expired(&self) -> usize {
        let mut jobs = self.jobs.lock().await;
        let now = Instant::now();
        let before = jobs.len();
        jobs.retain(|_, entry| entry.expires_at > now);
        before - jobs.len()
    }

    /// Snapshot of a stored job, for status inspection in tests.
    pub async fn job(&self, job_id: &str) -> Option<CompletionJob> {
        let jobs = self.jobs.lock().await;
        jobs.get(job_id).map(|entry| entry.job.clone())
    }
}
