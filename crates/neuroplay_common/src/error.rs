//! Error types for the completion pipeline.

use crate::session::GameType;
use thiserror::Error;

/// Failure taxonomy for one completion job.
///
/// Only [`PipelineError::Storage`] is retryable; everything else terminates
/// the job immediately with a clear reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("suspicious score: {score} points in {duration_seconds}s on {game_type} (max {max_score})")]
    SuspiciousScore {
        game_type: GameType,
        score: u32,
        max_score: u32,
        duration_seconds: u32,
    },

    #[error("student {0} not found")]
    StudentNotFound(i64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl PipelineError {
    /// Whether the worker dispatcher may retry the job after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Storage(_))
    }
}
