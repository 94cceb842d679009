//! Completion orchestrator.
//!
//! Runs one submission through the full pipeline: reconstruct and validate
//! the session, apply anti-cheat, compute rewards, persist the deltas and
//! build the result payload. Framework-free: repositories are injected as
//! trait objects and all I/O happens behind them.

use crate::repos::{AchievementRepository, GameRepository, StudentRepository};
use neuroplay_common::{
    anticheat, feedback, rewards, CompletionResult, GameSession, PipelineError,
    UnlockedAchievement,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CompletionOrchestrator {
    students: Arc<dyn StudentRepository>,
    games: Arc<dyn GameRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl CompletionOrchestrator {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        games: Arc<dyn GameRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            students,
            games,
            achievements,
        }
    }

    /// Execute one completion transaction.
    ///
    /// Payload and anti-cheat failures are terminal; storage failures
    /// bubble up as retryable for the dispatcher.
    pub async fn execute(
        &self,
        payload: &serde_json::Value,
    ) -> Result<CompletionResult, PipelineError> {
        let session = GameSession::from_payload(payload)?;

        if let Err(violation) = anticheat::validate_session(&session) {
            warn!(
                session_id = %session.session_id,
                student_id = session.student_id,
                "Anti-cheat rejection: {violation}"
            );
            return Err(violation);
        }

        let state = self.students.get_by_id(session.student_id).await?;

        let xp_gained = rewards::compute_xp(&session);
        let bonus_xp = rewards::compute_bonus_xp(&session, &state);
        let total_xp = xp_gained + bonus_xp;

        let applied = self.students.apply_xp(session.student_id, total_xp).await?;
        self.students
            .record_game_result(session.student_id, session.game_type, session.accuracy)
            .await?;

        let new_achievements = self.unlock_achievements(&session).await;

        self.games.save_session(&session).await?;

        info!(
            session_id = %session.session_id,
            student_id = session.student_id,
            total_xp,
            new_level = applied.level,
            "Completion processed"
        );

        let feedback = feedback::generate_feedback(&session, new_achievements.len());

        Ok(CompletionResult {
            session_id: session.session_id.clone(),
            xp_gained,
            bonus_xp,
            total_xp,
            new_total_xp: applied.xp,
            level: applied.level,
            leveled_up: applied.leveled_up,
            new_achievements,
            performance_rating: session.performance_rating(),
            difficulty_level: session.difficulty_level(),
            feedback,
        })
    }

    /// Evaluate the achievement conditions in fixed order and unlock the
    /// eligible ones. Unlock failures are best-effort enrichments, logged
    /// and skipped rather than failing the job.
    async fn unlock_achievements(&self, session: &GameSession) -> Vec<UnlockedAchievement> {
        let mut unlocked = Vec::new();

        for id in eligible_achievements(session) {
            match self.achievements.unlock(session.student_id, &id).await {
                Ok(true) => unlocked.push(UnlockedAchievement {
                    id,
                    unlocked_at: session.created_at,
                }),
                Ok(false) => {}
                Err(e) => warn!(
                    student_id = session.student_id,
                    achievement_id = %id,
                    "Achievement unlock failed, continuing: {e}"
                ),
            }
        }

        unlocked
    }
}

/// Achievement ids this session is eligible for, in evaluation order.
fn eligible_achievements(session: &GameSession) -> Vec<String> {
    let game = session.game_type.as_str();
    let mut ids = vec![format!("first_{game}")];

    if session.accuracy >= 0.95 && session.completed {
        ids.push(format!("perfect_score_{game}"));
    }
    if session.duration_seconds < 60 && session.completed {
        ids.push(format!("speed_demon_{game}"));
    }

    ids
}
