//! Anti-cheat validation for submitted sessions.
//!
//! Two checks against fixed per-game bounds: the total score cap, and the
//! points-per-second rate. The rate bound is 150% of the rate achievable in
//! a minimal 60-second optimal run; that 60-second reference window is a
//! deliberate constant, not derived from game data.

use crate::error::PipelineError;
use crate::session::GameSession;

/// Validate a session against the anti-cheat bounds.
///
/// A violation is a rejected submission, never a retryable error. When
/// `duration_seconds` is zero the rate check is skipped; the score cap still
/// applies.
pub fn validate_session(session: &GameSession) -> Result<(), PipelineError> {
    let max_score = session.game_type.max_score();

    if session.score > max_score {
        return Err(violation(session, max_score));
    }

    if session.duration_seconds > 0 {
        let points_per_second = f64::from(session.score) / f64::from(session.duration_seconds);
        let max_rate = f64::from(max_score) / 60.0;
        if points_per_second > max_rate * 1.5 {
            return Err(violation(session, max_score));
        }
    }

    Ok(())
}

fn violation(session: &GameSession, max_score: u32) -> PipelineError {
    PipelineError::SuspiciousScore {
        game_type: session.game_type,
        score: session.score,
        max_score,
        duration_seconds: session.duration_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameType;
    use chrono::Utc;
    use std::collections::HashMap;

    fn session(game_type: GameType, score: u32, duration_seconds: u32) -> GameSession {
        GameSession {
            session_id: "test".into(),
            student_id: 1,
            game_type,
            score,
            duration_seconds,
            accuracy: 0.8,
            completed: true,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_score_above_cap_regardless_of_duration() {
        for duration in [0, 1, 60, 600] {
            let err = validate_session(&session(GameType::CyberRunner, 1001, duration));
            assert!(matches!(
                err,
                Err(PipelineError::SuspiciousScore { score: 1001, max_score: 1000, .. })
            ));
        }
    }

    #[test]
    fn rejects_impossible_rate() {
        // 1000 points in 1 second is far beyond 16.6 * 1.5 pts/s.
        let err = validate_session(&session(GameType::CyberRunner, 1000, 1));
        assert!(err.is_err());
    }

    #[test]
    fn accepts_plausible_run() {
        assert!(validate_session(&session(GameType::CyberRunner, 500, 120)).is_ok());
    }

    #[test]
    fn zero_duration_skips_rate_check() {
        // Instant sync with a legal total must pass.
        assert!(validate_session(&session(GameType::CyberRunner, 900, 0)).is_ok());
    }

    #[test]
    fn per_game_caps_apply() {
        assert!(validate_session(&session(GameType::EchoTemple, 501, 300)).is_err());
        assert!(validate_session(&session(GameType::SonicJump, 800, 120)).is_ok());
        assert!(validate_session(&session(GameType::GravityLab, 601, 120)).is_err());
    }

    #[test]
    fn rate_boundary_is_inclusive() {
        // cyber_runner max rate = 1000/60 * 1.5 = 25 pts/s exactly.
        assert!(validate_session(&session(GameType::CyberRunner, 750, 30)).is_ok());
        assert!(validate_session(&session(GameType::CyberRunner, 751, 30)).is_err());
    }
}
