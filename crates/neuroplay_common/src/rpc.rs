//! Wire types exchanged between game clients, the CLI and the daemon.

use crate::feedback::Feedback;
use crate::session::PerformanceRating;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immediate acknowledgment for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAck {
    pub job_id: String,
    /// Always "processing"; the final result arrives via polling.
    pub status: String,
}

impl SubmitAck {
    pub fn processing(job_id: String) -> Self {
        Self {
            job_id,
            status: "processing".to_string(),
        }
    }
}

/// An achievement unlocked by this session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Terminal payload of a successfully processed completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub session_id: String,
    pub xp_gained: u64,
    pub bonus_xp: u64,
    pub total_xp: u64,
    pub new_total_xp: u64,
    pub level: u32,
    pub leveled_up: bool,
    pub new_achievements: Vec<UnlockedAchievement>,
    pub performance_rating: PerformanceRating,
    pub difficulty_level: u8,
    pub feedback: Feedback,
}

/// Observable job status returned by the polling endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatusResponse {
    NotFound { job_id: String },
    Processing { job_id: String },
    Completed { job_id: String, result: CompletionResult },
    Failed { job_id: String, reason: String },
}

/// Daemon health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub queue_depth: usize,
    pub workers: usize,
}

/// Register (or reset) a student with an optional starting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterStudentRequest {
    pub student_id: i64,
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default)]
    pub xp: u64,
}
