//! Score and statistics computation for finished practices.
//!
//! Both functions work on the per-card wrong-answer counts; `None` means the
//! card never received a wrong answer.

use crate::types::PracticeStats;

/// Compute the score of a finished practice, as a rounded 0-100 percentage.
///
/// A card counts against the score if it ever received a wrong answer, even
/// when it was eventually answered correctly. An empty practice scores 0.
pub fn compute_practice_score(wrong_counts: &[Option<i64>]) -> i32 {
    if wrong_counts.is_empty() {
        return 0;
    }

    let num_cards = wrong_counts.len() as f64;
    let cards_with_wrong_answers = wrong_counts
        .iter()
        .filter(|count| count.unwrap_or(0) > 0)
        .count() as f64;

    (((num_cards - cards_with_wrong_answers) / num_cards) * 100.0).round() as i32
}

/// Compute the statistics of a finished practice.
///
/// `average_attempts` is the mean wrong-answer count across all cards,
/// `total_wrong_answers` the sum, `num_cards` the card count.
pub fn compute_practice_stats(wrong_counts: &[Option<i64>]) -> PracticeStats {
    let num_cards = wrong_counts.len() as i64;
    let total_wrong_answers: i64 = wrong_counts.iter().map(|count| count.unwrap_or(0)).sum();

    let average_attempts = if num_cards == 0 {
        0.0
    } else {
        total_wrong_answers as f64 / num_cards as f64
    };

    PracticeStats {
        average_attempts,
        total_wrong_answers,
        num_cards,
    }
}
