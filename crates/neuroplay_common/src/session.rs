//! Game session entity.
//!
//! A `GameSession` is reconstructed once from an untrusted submission
//! payload, validated fail-fast, and never mutated afterwards. Derived
//! classifications (difficulty, performance rating) are pure functions of
//! the session fields.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The four standalone games that report telemetry to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    CyberRunner,
    EchoTemple,
    SonicJump,
    GravityLab,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::CyberRunner,
        GameType::EchoTemple,
        GameType::SonicJump,
        GameType::GravityLab,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::CyberRunner => "cyber_runner",
            GameType::EchoTemple => "echo_temple",
            GameType::SonicJump => "sonic_jump",
            GameType::GravityLab => "gravity_lab",
        }
    }

    /// Maximum plausible score for a legitimate run of this game.
    pub fn max_score(&self) -> u32 {
        match self {
            GameType::CyberRunner => 1000,
            GameType::EchoTemple => 500,
            GameType::SonicJump => 800,
            GameType::GravityLab => 600,
        }
    }

    /// Completion under this duration earns the speed XP multiplier.
    pub fn speed_threshold_secs(&self) -> u32 {
        match self {
            GameType::CyberRunner => 120,
            GameType::EchoTemple => 180,
            GameType::SonicJump => 90,
            GameType::GravityLab => 150,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performance rating shown back to the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl PerformanceRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceRating::Excellent => "excellent",
            PerformanceRating::Good => "good",
            PerformanceRating::Average => "average",
            PerformanceRating::NeedsImprovement => "needs_improvement",
        }
    }
}

/// One completed play attempt as reported by a game client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub student_id: i64,
    pub game_type: GameType,
    pub score: u32,
    pub duration_seconds: u32,
    /// Fraction of correct inputs, 0.0 to 1.0 inclusive.
    pub accuracy: f64,
    pub completed: bool,
    /// Opaque client-supplied key-value data, stored as-is.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Raw submission shape before validation. Missing id and timestamp are
/// defaulted during reconstruction.
#[derive(Debug, Clone, Deserialize)]
struct SessionPayload {
    #[serde(default)]
    session_id: Option<String>,
    student_id: i64,
    game_type: GameType,
    score: u32,
    duration_seconds: u32,
    accuracy: f64,
    completed: bool,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Reconstruct and validate a session from an untrusted JSON payload.
    ///
    /// Any shape or invariant violation fails with
    /// [`PipelineError::InvalidPayload`]; no partially-valid session exists.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, PipelineError> {
        let raw: SessionPayload = serde_json::from_value(payload.clone())
            .map_err(|e| PipelineError::InvalidPayload(e.to_string()))?;

        let session = GameSession {
            session_id: match raw.session_id {
                Some(id) if !id.is_empty() => id,
                _ => uuid::Uuid::new_v4().to_string(),
            },
            student_id: raw.student_id,
            game_type: raw.game_type,
            score: raw.score,
            duration_seconds: raw.duration_seconds,
            accuracy: raw.accuracy,
            completed: raw.completed,
            metadata: raw.metadata,
            created_at: raw.created_at.unwrap_or_else(Utc::now),
        };
        session.validate()?;
        Ok(session)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.student_id <= 0 {
            return Err(PipelineError::InvalidPayload(format!(
                "student_id must be positive, got {}",
                self.student_id
            )));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(PipelineError::InvalidPayload(format!(
                "accuracy must be between 0 and 1, got {}",
                self.accuracy
            )));
        }
        Ok(())
    }

    /// Difficulty the student is ready for, 1 (easy) to 5 (very hard).
    pub fn difficulty_level(&self) -> u8 {
        if self.accuracy >= 0.9 {
            5
        } else if self.accuracy >= 0.75 {
            4
        } else if self.accuracy >= 0.6 {
            3
        } else if self.accuracy >= 0.4 {
            2
        } else {
            1
        }
    }

    pub fn performance_rating(&self) -> PerformanceRating {
        if self.accuracy >= 0.9 && self.completed {
            PerformanceRating::Excellent
        } else if self.accuracy >= 0.75 {
            PerformanceRating::Good
        } else if self.accuracy >= 0.5 {
            PerformanceRating::Average
        } else {
            PerformanceRating::NeedsImprovement
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(overrides: serde_json::Value) -> serde_json::Value {
        let mut base = json!({
            "student_id": 1,
            "game_type": "cyber_runner",
            "score": 500,
            "duration_seconds": 120,
            "accuracy": 0.85,
            "completed": true,
        });
        base.as_object_mut()
            .unwrap()
            .extend(overrides.as_object().unwrap().clone());
        base
    }

    #[test]
    fn reconstructs_valid_session_and_defaults_id() {
        let session = GameSession::from_payload(&payload(json!({}))).unwrap();
        assert_eq!(session.score, 500);
        assert_eq!(session.game_type, GameType::CyberRunner);
        assert!(!session.session_id.is_empty());
    }

    #[test]
    fn keeps_provided_session_id() {
        let session =
            GameSession::from_payload(&payload(json!({"session_id": "abc-123"}))).unwrap();
        assert_eq!(session.session_id, "abc-123");
    }

    #[test]
    fn rejects_negative_score() {
        let err = GameSession::from_payload(&payload(json!({"score": -5}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_unknown_game_type() {
        let err =
            GameSession::from_payload(&payload(json!({"game_type": "pong"}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_out_of_range_accuracy() {
        let err = GameSession::from_payload(&payload(json!({"accuracy": 1.2}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
        let err = GameSession::from_payload(&payload(json!({"accuracy": -0.1}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_non_positive_student() {
        let err = GameSession::from_payload(&payload(json!({"student_id": 0}))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload(_)));
    }

    #[test]
    fn difficulty_is_monotonic_in_accuracy() {
        let mut last = 0;
        for accuracy in [0.0, 0.39, 0.4, 0.6, 0.75, 0.9, 1.0] {
            let session =
                GameSession::from_payload(&payload(json!({"accuracy": accuracy}))).unwrap();
            let level = session.difficulty_level();
            assert!(level >= last, "difficulty dropped at accuracy {accuracy}");
            last = level;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn excellent_requires_completion() {
        let done = GameSession::from_payload(&payload(json!({"accuracy": 0.95}))).unwrap();
        assert_eq!(done.performance_rating(), PerformanceRating::Excellent);

        let abandoned = GameSession::from_payload(
            &payload(json!({"accuracy": 0.95, "completed": false})),
        )
        .unwrap();
        assert_eq!(abandoned.performance_rating(), PerformanceRating::Good);
    }

    #[test]
    fn rating_thresholds() {
        for (accuracy, expected) in [
            (0.5, PerformanceRating::Average),
            (0.49, PerformanceRating::NeedsImprovement),
            (0.75, PerformanceRating::Good),
        ] {
            let session =
                GameSession::from_payload(&payload(json!({"accuracy": accuracy}))).unwrap();
            assert_eq!(session.performance_rating(), expected);
        }
    }
}
