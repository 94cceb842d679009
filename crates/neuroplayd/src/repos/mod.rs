//! Repository ports for the completion orchestrator.
//!
//! The orchestrator is polymorphic over these traits; production wires real
//! storage adapters, tests and the default deployment use the in-memory
//! implementations in [`memory`].

pub mod memory;

use async_trait::async_trait;
use neuroplay_common::{GameSession, GameType, PipelineError, StudentRewardState};
use serde::{Deserialize, Serialize};

pub use memory::{InMemoryAchievementRepository, InMemoryGameRepository, InMemoryStudentRepository};

/// Outcome of an atomic XP application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpApplied {
    pub xp: u64,
    pub level: u32,
    pub leveled_up: bool,
}

/// Student progression storage.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn get_by_id(&self, student_id: i64) -> Result<StudentRewardState, PipelineError>;

    /// Add XP atomically. Concurrent completions for the same student must
    /// serialize here so increments are never lost.
    async fn apply_xp(&self, student_id: i64, delta: u64) -> Result<XpApplied, PipelineError>;

    /// Record that the student played a game at the given accuracy, feeding
    /// future first-time and improvement bonuses.
    async fn record_game_result(
        &self,
        student_id: i64,
        game_type: GameType,
        accuracy: f64,
    ) -> Result<(), PipelineError>;
}

/// Persisted game sessions.
#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn save_session(&self, session: &GameSession) -> Result<(), PipelineError>;

    async fn sessions_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<GameSession>, PipelineError>;
}

/// Per-student achievement flags with set semantics.
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Returns `true` iff the achievement was newly unlocked. Unlocking an
    /// already-unlocked id is a no-op, not an error.
    async fn unlock(&self, student_id: i64, achievement_id: &str) -> Result<bool, PipelineError>;

    async fn unlocked_for(&self, student_id: i64) -> Result<Vec<String>, PipelineError>;
}
