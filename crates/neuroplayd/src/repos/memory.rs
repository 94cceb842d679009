//! In-memory repository adapters.
//!
//! Each adapter serializes access through one mutex, which makes XP
//! application a linearizable read-modify-write and achievement unlocking
//! idempotent under concurrent duplicates.

use super::{AchievementRepository, GameRepository, StudentRepository, XpApplied};
use async_trait::async_trait;
use neuroplay_common::{GameSession, GameType, PipelineError, StudentRewardState};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

/// XP required per level.
const XP_PER_LEVEL: u64 = 1000;

fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL) as u32 + 1
}

/// Student progression store backed by a mutex-guarded map.
#[derive(Default)]
pub struct InMemoryStudentRepository {
    students: Mutex<HashMap<i64, StudentRewardState>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a student, replacing any existing state. Returns the stored
    /// snapshot with its level derived from XP.
    pub async fn register(&self, student_id: i64, mut state: StudentRewardState) -> StudentRewardState {
        state.level = level_for_xp(state.xp);
        let mut students = self.students.lock().await;
        students.insert(student_id, state.clone());
        state
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn get_by_id(&self, student_id: i64) -> Result<StudentRewardState, PipelineError> {
        let students = self.students.lock().await;
        students
            .get(&student_id)
            .cloned()
            .ok_or(PipelineError::StudentNotFound(student_id))
    }

    async fn apply_xp(&self, student_id: i64, delta: u64) -> Result<XpApplied, PipelineError> {
        let mut students = self.students.lock().await;
        let state = students
            .get_mut(&student_id)
            .ok_or(PipelineError::StudentNotFound(student_id))?;

        let old_level = state.level.max(1);
        state.xp += delta;
        state.level = level_for_xp(state.xp);

        Ok(XpApplied {
            xp: state.xp,
            level: state.level,
            leveled_up: state.level > old_level,
        })
    }

    async fn record_game_result(
        &self,
        student_id: i64,
        game_type: GameType,
        accuracy: f64,
    ) -> Result<(), PipelineError> {
        let mut students = self.students.lock().await;
        let state = students
            .get_mut(&student_id)
            .ok_or(PipelineError::StudentNotFound(student_id))?;
        state.games_played.insert(game_type);
        state.last_accuracy_by_game.insert(game_type, accuracy);
        Ok(())
    }
}

/// Session log backed by a mutex-guarded vector.
#[derive(Default)]
pub struct InMemoryGameRepository {
    sessions: Mutex<Vec<GameSession>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn save_session(&self, session: &GameSession) -> Result<(), PipelineError> {
        let mut sessions = self.sessions.lock().await;
        sessions.push(session.clone());
        Ok(())
    }

    async fn sessions_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<GameSession>, PipelineError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }
}

/// Achievement flags with set semantics.
#[derive(Default)]
pub struct InMemoryAchievementRepository {
    unlocked: Mutex<HashMap<i64, BTreeSet<String>>>,
}

impl InMemoryAchievementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AchievementRepository for InMemoryAchievementRepository {
    async fn unlock(&self, student_id: i64, achievement_id: &str) -> Result<bool, PipelineError> {
        let mut unlocked = self.unlocked.lock().await;
        Ok(unlocked
            .entry(student_id)
            .or_default()
            .insert(achievement_id.to_string()))
    }

    async fn unlocked_for(&self, student_id: i64) -> Result<Vec<String>, PipelineError> {
        let unlocked = self.unlocked.lock().await;
        Ok(unlocked
            .get(&student_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}
