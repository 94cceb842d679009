//! XP and bonus calculation.
//!
//! Pure and deterministic: the same session and state snapshot always yield
//! the same XP. Multipliers truncate to integer after each step, in the
//! order accuracy -> speed -> completion; the bonus pool is additive and
//! never multiplied.

use crate::session::{GameSession, GameType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Streak bonus per consecutive day, and its cap.
const STREAK_XP_PER_DAY: u64 = 50;
const STREAK_XP_CAP: u64 = 500;

/// Bonus for the first session ever on a game.
const FIRST_PLAY_XP: u64 = 200;

/// Bonus for beating the last recorded accuracy by more than this margin.
const IMPROVEMENT_MARGIN: f64 = 0.10;
const IMPROVEMENT_XP: u64 = 100;

/// Flat XP for finishing a game.
const COMPLETION_XP: u64 = 100;

/// Snapshot of a student's progression used to compute rewards.
///
/// Owned by the student repository; the orchestrator reads a snapshot and
/// writes back a delta, never holding it across await points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentRewardState {
    pub xp: u64,
    pub level: u32,
    /// Consecutive days with at least one completed session.
    pub daily_streak: u32,
    /// Games this student has played at least once.
    pub games_played: HashSet<GameType>,
    /// Last recorded accuracy per game, for the improvement bonus.
    pub last_accuracy_by_game: HashMap<GameType, f64>,
}

/// Base XP for a session: score, then accuracy multiplier, then speed
/// multiplier, then the flat completion bonus.
pub fn compute_xp(session: &GameSession) -> u64 {
    let mut xp = u64::from(session.score);

    if session.accuracy >= 0.9 {
        xp = (xp as f64 * 1.5) as u64;
    } else if session.accuracy >= 0.75 {
        xp = (xp as f64 * 1.25) as u64;
    }

    if session.completed && session.duration_seconds < session.game_type.speed_threshold_secs() {
        xp = (xp as f64 * 1.25) as u64;
    }

    if session.completed {
        xp += COMPLETION_XP;
    }

    xp
}

/// Bonus XP from the student's progression context. Additive pool: the
/// multipliers above never touch it.
pub fn compute_bonus_xp(session: &GameSession, state: &StudentRewardState) -> u64 {
    let mut bonus = 0;

    if !state.games_played.contains(&session.game_type) {
        bonus += FIRST_PLAY_XP;
    }

    bonus += (u64::from(state.daily_streak) * STREAK_XP_PER_DAY).min(STREAK_XP_CAP);

    let last_accuracy = state
        .last_accuracy_by_game
        .get(&session.game_type)
        .copied()
        .unwrap_or(0.0);
    if session.accuracy > last_accuracy + IMPROVEMENT_MARGIN {
        bonus += IMPROVEMENT_XP;
    }

    bonus
}
