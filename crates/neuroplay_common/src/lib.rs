//! Shared domain core for the NeuroPlay completion pipeline.
//!
//! Everything in this crate is framework-free: entities, anti-cheat
//! validation, reward calculation, feedback generation, the job model and
//! the wire types exchanged with the daemon. No I/O happens here.

pub mod anticheat;
pub mod error;
pub mod feedback;
pub mod job;
pub mod rewards;
pub mod rpc;
pub mod session;

pub use anticheat::validate_session;
pub use error::PipelineError;
pub use feedback::Feedback;
pub use job::{CompletionJob, JobStatus};
pub use rewards::{compute_bonus_xp, compute_xp, StudentRewardState};
pub use rpc::{
    CompletionResult, HealthResponse, JobStatusResponse, RegisterStudentRequest, SubmitAck,
    UnlockedAchievement,
};
pub use session::{GameSession, GameType, PerformanceRating};

/// Crate version, reported by the daemon health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
