//! Completion job model.
//!
//! One asynchronous unit of work tracked from submission to terminal
//! status. Created by the intake path, mutated only by the worker
//! dispatcher, expired by TTL if never delivered.

use crate::rpc::CompletionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A queued gameplay submission and its processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionJob {
    /// Job id, also used as the polling key.
    pub job_id: String,
    /// Raw submission payload, reconstructed into a session by the worker.
    pub payload: serde_json::Value,
    pub status: JobStatus,
    /// Present iff the job completed.
    pub result: Option<CompletionResult>,
    /// Present iff the job failed.
    pub failure_reason: Option<String>,
    /// Number of processing tries so far.
    pub attempts: u32,
    pub max_attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionJob {
    pub fn new(job_id: String, payload: serde_json::Value, max_attempts: u32) -> Self {
        Self {
            job_id,
            payload,
            status: JobStatus::Pending,
            result: None,
            failure_reason: None,
            attempts: 0,
            max_attempts,
            enqueued_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Mark the start of a processing try.
    pub fn start_attempt(&mut self) {
        self.attempts += 1;
        self.status = JobStatus::Processing;
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    pub fn complete(&mut self, result: CompletionResult) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.failure_reason = None;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: String) {
        self.status = JobStatus::Failed;
        self.failure_reason = Some(reason);
        self.completed_at = Some(Utc::now());
    }

    /// Whether another try is allowed after a transient failure.
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Delay before the next try: base * 2^attempt, counting completed
    /// tries. First retry waits base * 2, second base * 4.
    pub fn backoff_delay(&self, base: Duration) -> Duration {
        base * 2u32.saturating_pow(self.attempts.min(16))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}
