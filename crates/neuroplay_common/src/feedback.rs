//! Feedback generation for completed sessions.
//!
//! A rating-to-message lookup plus a list of improvement suggestions built
//! from independent predicates. Suggestions are additive and keep their
//! evaluation order.

use crate::session::{GameSession, PerformanceRating};
use serde::{Deserialize, Serialize};

/// Duration above which the pace suggestion fires.
const SLOW_SESSION_SECS: u32 = 300;

/// Personalized feedback returned with the completion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub rating: PerformanceRating,
    pub achievements_unlocked: usize,
    pub suggestions: Vec<String>,
}

/// Build feedback for a session and the number of achievements it unlocked.
pub fn generate_feedback(session: &GameSession, achievements_unlocked: usize) -> Feedback {
    let rating = session.performance_rating();

    let message = match rating {
        PerformanceRating::Excellent => "Amazing! You are mastering this game!",
        PerformanceRating::Good => "Well done! Keep it up!",
        PerformanceRating::Average => "Good work! You are getting better!",
        PerformanceRating::NeedsImprovement => "Keep trying! You will get there!",
    };

    Feedback {
        message: message.to_string(),
        rating,
        achievements_unlocked,
        suggestions: suggestions_for(session),
    }
}

fn suggestions_for(session: &GameSession) -> Vec<String> {
    let mut suggestions = Vec::new();

    if session.accuracy < 0.7 {
        suggestions.push("Try to focus on precision over speed".to_string());
    }
    if !session.completed {
        suggestions.push("Try to complete the game next time".to_string());
    }
    if session.duration_seconds > SLOW_SESSION_SECS {
        suggestions.push("Try to make faster decisions".to_string());
    }

    suggestions
}
