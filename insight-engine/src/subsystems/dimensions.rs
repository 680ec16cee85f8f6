//! Struggle dimension calculators
//!
//! Three pure signals over a session's student turns, each in [0, 1] where
//! higher means more struggle:
//!
//! - socratic depth: share of surface ("what is X") questions among all
//!   classified questions
//! - error persistence: confusion rate plus a penalty for back-to-back confusion
//! - frustration sentiment: resignation in the last 3 turns, with a weak signal
//!   for terse late replies
//!
//! Tutor turns never contribute. Empty input scores 0 everywhere.

use insight_core::models::ConversationTurn;
use insight_core::Lexicon;

/// Penalty added per consecutive confused pair.
const CONSECUTIVE_CONFUSION_STEP: f64 = 0.1;
const CONSECUTIVE_CONFUSION_CAP: f64 = 0.3;

/// Frustration looks only at this many trailing student turns.
const FRUSTRATION_WINDOW: usize = 3;
/// Of the window, only this many trailing turns can count as terse.
const TERSE_WINDOW: usize = 2;
/// Trimmed replies shorter than this (in chars) are terse.
const TERSE_MAX_CHARS: usize = 15;
const TERSE_WEIGHT: f64 = 0.3;

/// Lower-cased text of the student-authored turns, in order.
pub fn student_texts(turns: &[ConversationTurn]) -> Vec<String> {
    turns
        .iter()
        .filter(|t| t.is_student())
        .map(|t| t.content.to_lowercase())
        .collect()
}

pub fn socratic_depth(student_turns: &[String], lexicon: &Lexicon) -> f64 {
    let surface = student_turns.iter().filter(|t| lexicon.is_surface(t)).count();
    let deep = student_turns.iter().filter(|t| lexicon.is_deep(t)).count();

    let total = surface + deep;
    if total == 0 {
        return 0.0;
    }
    (surface as f64 / total as f64).min(1.0)
}

pub fn error_persistence(student_turns: &[String], lexicon: &Lexicon) -> f64 {
    if student_turns.is_empty() {
        return 0.0;
    }

    let confused: Vec<bool> = student_turns.iter().map(|t| lexicon.is_confused(t)).collect();
    let confused_count = confused.iter().filter(|c| **c).count();
    let raw_rate = confused_count as f64 / student_turns.len() as f64;

    let consecutive = confused.windows(2).filter(|w| w[0] && w[1]).count();
    let penalty = (consecutive as f64 * CONSECUTIVE_CONFUSION_STEP).min(CONSECUTIVE_CONFUSION_CAP);

    (raw_rate + penalty).min(1.0)
}

pub fn frustration_sentiment(student_turns: &[String], lexicon: &Lexicon) -> f64 {
    let window_start = student_turns.len().saturating_sub(FRUSTRATION_WINDOW);
    let window = &student_turns[window_start..];
    let terse_start = window.len().saturating_sub(TERSE_WINDOW);

    let total: f64 = window
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if lexicon.is_frustrated(text) {
                1.0
            } else if i >= terse_start && text.trim().chars().count() < TERSE_MAX_CHARS {
                TERSE_WEIGHT
            } else {
                0.0
            }
        })
        .sum();

    (total / FRUSTRATION_WINDOW as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::bundled().unwrap()
    }

    fn texts(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_lowercase()).collect()
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let lex = lexicon();
        assert_eq!(socratic_depth(&[], &lex), 0.0);
        assert_eq!(error_persistence(&[], &lex), 0.0);
        assert_eq!(frustration_sentiment(&[], &lex), 0.0);
    }

    #[test]
    fn test_student_texts_skip_tutor_turns() {
        let turns = vec![
            ConversationTurn::tutor("What is a fraction?"),
            ConversationTurn::student("I Don't Know"),
        ];
        assert_eq!(student_texts(&turns), vec!["i don't know".to_string()]);
    }

    #[test]
    fn test_socratic_depth_ratio() {
        let lex = lexicon();
        let turns = texts(&[
            "what is a denominator exactly?",
            "why do we flip the second fraction?",
            "what is a numerator again, sorry",
            "ok let me try the next problem now",
        ]);
        let score = socratic_depth(&turns, &lex);
        assert!((score - 2.0 / 3.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_socratic_depth_unclassified_is_zero() {
        let lex = lexicon();
        let turns = texts(&["the answer is twelve i think", "let me try again please"]);
        assert_eq!(socratic_depth(&turns, &lex), 0.0);
    }

    #[test]
    fn test_error_persistence_consecutive_penalty() {
        let lex = lexicon();
        let turns = texts(&[
            "i don't understand the question",
            "i'm still confused about the carry",
            "that doesn't make sense to me",
            "ok the answer is forty two",
        ]);
        // 3/4 confused + 2 consecutive pairs * 0.1
        let score = error_persistence(&turns, &lex);
        assert!((score - 0.95).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_error_persistence_penalty_is_capped() {
        let lex = lexicon();
        let turns = texts(&[
            "i don't understand",
            "i don't understand",
            "i don't understand",
            "i don't understand",
            "i don't understand",
        ]);
        assert_eq!(error_persistence(&turns, &lex), 1.0);
    }

    #[test]
    fn test_error_persistence_isolated_confusion() {
        let lex = lexicon();
        let turns = texts(&[
            "i'm confused by this word",
            "the area is twenty square meters",
            "i don't get why we multiply here",
            "the perimeter is eighteen meters",
        ]);
        assert!((error_persistence(&turns, &lex) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_frustration_uses_last_three_turns_only() {
        let lex = lexicon();
        let turns = texts(&[
            "i give up on this whole thing",
            "the slope is rise over run right",
            "so i divide both sides by three",
            "and then the answer is x equals four",
        ]);
        assert_eq!(frustration_sentiment(&turns, &lex), 0.0);
    }

    #[test]
    fn test_frustration_counts_resignation_and_terse_replies() {
        let lex = lexicon();
        let turns = texts(&[
            "this is pointless, i give up",
            "ok",
            "fine whatever",
        ]);
        // 1.0 (resignation) + 0.3 (terse "ok") + 1.0 ("whatever") over 3
        let score = frustration_sentiment(&turns, &lex);
        assert!((score - 2.3 / 3.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_terse_first_turn_of_window_does_not_count() {
        let lex = lexicon();
        let turns = texts(&["yes", "the mitochondria makes energy", "it stores the genetic code"]);
        assert_eq!(frustration_sentiment(&turns, &lex), 0.0);
    }

    #[test]
    fn test_short_window_still_divides_by_three() {
        let lex = lexicon();
        let turns = texts(&["idk"]);
        assert!((frustration_sentiment(&turns, &lex) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let lex = lexicon();
        let turns = texts(&[
            "ugh i give up",
            "i give up, this is stupid",
            "whatever, forget it",
        ]);
        let score = frustration_sentiment(&turns, &lex);
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(score, 1.0);
    }
}
