//! # Pronunciation Analysis Module
//!
//! Pure scoring logic that turns an expected text and a spoken transcript into
//! structured feedback. Nothing in here performs I/O or holds state, so every
//! function can be called from any request handler without synchronization.
//!
//! ## Key Components:
//! - **Syllables**: Heuristic vowel-run syllable splitter
//! - **Similarity**: Ratcliff/Obershelp matching-blocks ratio
//! - **Scorer**: Syllable-by-syllable comparison of a single word
//! - **Phrase**: Word-by-word comparison of a whole sentence
//! - **Session**: Averaging exercise scores into improvement tips
//! - **Simulation**: Flagged stand-in analysis when no transcript exists

pub mod syllables;   // Vowel-run syllable segmentation
pub mod similarity;  // Character-level similarity ratio
pub mod scorer;      // Word comparison and tiered feedback
pub mod phrase;      // Sentence-level analysis and suggestions
pub mod session;     // Practice session aggregation
pub mod simulation;  // Simulated analysis for degraded providers

pub use phrase::analyze_phrase;
pub use scorer::{compare_words, Status, SyllableFeedback};
pub use session::{summarize_session, ExerciseScore};
pub use simulation::simulate_analysis;

use thiserror::Error;

/// Inputs the analysis functions refuse to score.
///
/// Both variants describe caller mistakes: the handlers validate their input
/// and map these to a 400 response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The expected word or sentence is empty after trimming.
    #[error("expected text must not be empty")]
    EmptyTarget,

    /// A session summary was requested without any exercise results.
    #[error("at least one exercise result is required")]
    NoResults,
}
