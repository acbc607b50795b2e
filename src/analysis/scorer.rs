//! # Word Comparison Scorer
//!
//! Compares what the learner was asked to say with what the recognizer heard,
//! one syllable at a time.
//!
//! ## Scoring Policy:
//! - **Per syllable**: similarity ratio × 100, truncated to an integer
//! - **Syllable tiers**: ratio > 0.8 good, > 0.5 needs work, otherwise poor
//! - **Missing syllables**: expected syllables with no spoken counterpart score 0
//! - **Overall**: truncated mean over the *expected* syllable count
//! - **Overall tiers**: score > 80 good, > 50 needs work, otherwise poor
//!
//! ## Alignment:
//! Syllables are paired by position only. A shorter transcript leaves the
//! trailing expected syllables missing; extra spoken syllables are ignored.

use serde::{Deserialize, Serialize};

use super::similarity::ratio;
use super::syllables::syllabify;
use super::AnalysisError;

const PERFECT_MESSAGE: &str = "Perfect! You pronounced it correctly.";
const GOOD_MESSAGE: &str = "Very good! Just a few minor improvements needed.";
const NEEDS_WORK_MESSAGE: &str = "Keep practicing! Focus on the highlighted syllables.";
const POOR_MESSAGE: &str = "Let's break this down and practice each syllable.";

/// Classification bucket for a syllable or a whole attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Exact match after normalization (whole attempt only)
    Perfect,
    Good,
    NeedsWork,
    Poor,
    /// Expected syllable had no spoken counterpart (syllables only)
    Missing,
}

impl Status {
    /// Tier for a single syllable's similarity ratio.
    fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            Status::Good
        } else if ratio > 0.5 {
            Status::NeedsWork
        } else {
            Status::Poor
        }
    }

    /// Tier and learner-facing message for an aggregate score.
    fn overall(score: u32) -> (Self, &'static str) {
        if score > 80 {
            (Status::Good, GOOD_MESSAGE)
        } else if score > 50 {
            (Status::NeedsWork, NEEDS_WORK_MESSAGE)
        } else {
            (Status::Poor, POOR_MESSAGE)
        }
    }
}

/// Feedback for one expected syllable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableFeedback {
    pub syllable: String,
    pub status: Status,
    /// 0-100
    pub score: u32,
}

/// Outcome of comparing one expected text with one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub status: Status,
    pub message: String,
    /// One entry per expected syllable, in order. Empty for a perfect match.
    pub syllable_feedback: Vec<SyllableFeedback>,
    /// 0-100
    pub score: u32,
}

/// Compare an expected word (or sentence) with the spoken transcript.
///
/// Both inputs are lowercased and trimmed first. An exact match short-circuits
/// to a perfect result without a syllable breakdown. An empty `spoken` is
/// valid and marks every expected syllable missing.
///
/// ## Errors:
/// Returns [`AnalysisError::EmptyTarget`] when `expected` is blank, since
/// there would be no syllables to average over.
pub fn compare_words(expected: &str, spoken: &str) -> Result<ComparisonResult, AnalysisError> {
    let expected = expected.trim().to_lowercase();
    let spoken = spoken.trim().to_lowercase();

    if expected.is_empty() {
        return Err(AnalysisError::EmptyTarget);
    }

    if expected == spoken {
        return Ok(ComparisonResult {
            status: Status::Perfect,
            message: PERFECT_MESSAGE.to_string(),
            syllable_feedback: Vec::new(),
            score: 100,
        });
    }

    let expected_syllables = syllabify(&expected);
    let spoken_syllables = syllabify(&spoken);

    let syllable_feedback: Vec<SyllableFeedback> = expected_syllables
        .iter()
        .enumerate()
        .map(|(i, syllable)| match spoken_syllables.get(i) {
            Some(heard) => {
                let similarity = ratio(syllable, heard);
                SyllableFeedback {
                    syllable: syllable.clone(),
                    status: Status::from_ratio(similarity),
                    score: (similarity * 100.0) as u32,
                }
            }
            None => SyllableFeedback {
                syllable: syllable.clone(),
                status: Status::Missing,
                score: 0,
            },
        })
        .collect();

    // Non-empty expected text always yields at least one syllable
    let total: u32 = syllable_feedback.iter().map(|f| f.score).sum();
    let score = total / syllable_feedback.len() as u32;
    let (status, message) = Status::overall(score);

    Ok(ComparisonResult {
        status,
        message: message.to_string(),
        syllable_feedback,
        score,
    })
}
