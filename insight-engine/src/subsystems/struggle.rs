//! Struggle scorer
//!
//! composite = clamp((0.25 x socratic + 0.35 x persistence + 0.40 x frustration)
//!             x developmental multiplier, 0, 1)
//!
//! All four values are rounded to 3 decimals. Persisting the result is
//! advisory: a failed write is logged and the computed value still returned.

use insight_core::config::ScoringConfig;
use insight_core::models::{ConversationTurn, QuickCheck, StruggleDimensions};
use insight_core::{InsightStore, Lexicon, Result};
use uuid::Uuid;

use super::calibrate::developmental_multiplier;
use super::dimensions::{error_persistence, frustration_sentiment, socratic_depth, student_texts};

pub const WEIGHT_SOCRATIC: f64 = 0.25;
pub const WEIGHT_PERSISTENCE: f64 = 0.35;
pub const WEIGHT_FRUSTRATION: f64 = 0.40;

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Pure scoring; no storage involved.
pub fn score(
    turns: &[ConversationTurn],
    age: Option<i32>,
    grade_level: Option<&str>,
    lexicon: &Lexicon,
) -> StruggleDimensions {
    let texts = student_texts(turns);

    let socratic = socratic_depth(&texts, lexicon);
    let persistence = error_persistence(&texts, lexicon);
    let frustration = frustration_sentiment(&texts, lexicon);

    let raw_composite = socratic * WEIGHT_SOCRATIC
        + persistence * WEIGHT_PERSISTENCE
        + frustration * WEIGHT_FRUSTRATION;
    let composite = (raw_composite * developmental_multiplier(age, grade_level)).clamp(0.0, 1.0);

    StruggleDimensions {
        socratic_depth: round3(socratic),
        error_persistence: round3(persistence),
        frustration_sentiment: round3(frustration),
        composite: round3(composite),
    }
}

/// Scores and overwrites the session's stored record. Never fails on the write.
pub async fn score_and_persist(
    store: &dyn InsightStore,
    session_id: Uuid,
    turns: &[ConversationTurn],
    age: Option<i32>,
    grade_level: Option<&str>,
    lexicon: &Lexicon,
) -> StruggleDimensions {
    let dims = score(turns, age, grade_level, lexicon);

    match store.write_struggle(session_id, &dims).await {
        Ok(()) => tracing::debug!(
            session_id = %session_id,
            composite = dims.composite,
            "Struggle score persisted"
        ),
        Err(e) => tracing::warn!(
            session_id = %session_id,
            error = %e,
            "Failed to persist struggle score (non-fatal)"
        ),
    }

    dims
}

/// In-the-moment signal without a write.
pub fn quick_check(
    turns: &[ConversationTurn],
    age: Option<i32>,
    grade_level: Option<&str>,
    lexicon: &Lexicon,
    config: &ScoringConfig,
) -> QuickCheck {
    let dims = score(turns, age, grade_level, lexicon);
    QuickCheck {
        is_struggling: dims.composite >= config.struggling_threshold,
        score: dims.composite,
    }
}

/// Loads a session's turns and learner profile, then scores and persists.
/// Only the reads can fail; the write stays fail-open.
pub async fn score_session(
    store: &dyn InsightStore,
    session_id: Uuid,
    lexicon: &Lexicon,
) -> Result<StruggleDimensions> {
    let turns = store.session_turns(session_id).await?;
    let profile = store.session_learner(session_id).await?.unwrap_or_default();

    Ok(score_and_persist(
        store,
        session_id,
        &turns,
        profile.age,
        profile.grade_level.as_deref(),
        lexicon,
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::bundled().unwrap()
    }

    #[test]
    fn test_empty_turns_score_zero() {
        let dims = score(&[], None, None, &lexicon());
        assert_eq!(dims, StruggleDimensions::default());
    }

    #[test]
    fn test_surface_only_high_school() {
        let turns = vec![
            ConversationTurn::student("what is photosynthesis?"),
            ConversationTurn::tutor("Great question. Let's start with sunlight."),
            ConversationTurn::student("what is a chloroplast exactly?"),
            ConversationTurn::student("what is the definition of glucose?"),
        ];
        let dims = score(&turns, Some(16), Some("10"), &lexicon());

        assert_eq!(dims.socratic_depth, 1.0);
        assert_eq!(dims.error_persistence, 0.0);
        assert_eq!(dims.frustration_sentiment, 0.0);
        assert_eq!(dims.composite, 0.3);
    }

    #[test]
    fn test_composite_is_clamped() {
        let turns = vec![
            ConversationTurn::student("what is this? i don't understand, i give up"),
            ConversationTurn::student("i'm so confused, i give up"),
            ConversationTurn::student("whatever, this is stupid"),
        ];
        let dims = score(&turns, None, Some("12"), &lexicon());
        assert_eq!(dims.composite, 1.0);
        for v in [dims.socratic_depth, dims.error_persistence, dims.frustration_sentiment] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_younger_students_are_scaled_down() {
        let turns = vec![
            ConversationTurn::student("i don't understand the borrowing part"),
            ConversationTurn::student("so seven minus three is four"),
        ];
        let lex = lexicon();
        let reference = score(&turns, None, None, &lex);
        let early = score(&turns, Some(6), None, &lex);
        assert!(early.composite < reference.composite);
        assert_eq!(early.error_persistence, reference.error_persistence);
    }

    #[test]
    fn test_quick_check_threshold() {
        let lex = lexicon();
        let config = ScoringConfig::default();

        let calm = quick_check(
            &[ConversationTurn::student("why does the moon have phases at all")],
            None,
            None,
            &lex,
            &config,
        );
        assert!(!calm.is_struggling);
        assert_eq!(calm.score, 0.0);

        let stuck = quick_check(
            &[
                ConversationTurn::student("i don't get it"),
                ConversationTurn::student("i still don't understand, i give up"),
                ConversationTurn::student("ugh"),
            ],
            None,
            None,
            &lex,
            &config,
        );
        assert!(stuck.is_struggling);
        assert!(stuck.score >= 0.5);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.30000000000000004), 0.3);
        assert_eq!(round3(2.0 / 3.0), 0.667);
        assert_eq!(round3(0.0), 0.0);
    }
}
