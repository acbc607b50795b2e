//! Sentence-level analysis used by the free-form speech exercises.
//!
//! Unlike the word scorer this works on whole words: the overall score is the
//! similarity of the two full sentences and every target word gets a
//! correct/incorrect verdict from its positional counterpart.

use serde::{Deserialize, Serialize};

use super::similarity::ratio;

const WORD_MATCH_THRESHOLD: f64 = 0.8;

/// Verdict for one target word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnalysis {
    /// The target word (the frontend calls this field "phoneme")
    pub phoneme: String,
    pub correct: bool,
    pub feedback: String,
}

impl WordAnalysis {
    pub(crate) fn good(word: &str) -> Self {
        Self {
            phoneme: word.to_string(),
            correct: true,
            feedback: "Good pronunciation".to_string(),
        }
    }

    pub(crate) fn misheard(word: &str, heard: &str) -> Self {
        Self {
            phoneme: word.to_string(),
            correct: false,
            feedback: format!("Heard '{}' instead of '{}'", heard, word),
        }
    }

    fn not_detected(word: &str) -> Self {
        Self {
            phoneme: word.to_string(),
            correct: false,
            feedback: "Word was not detected".to_string(),
        }
    }
}

/// Result of analysing a spoken sentence against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseAnalysis {
    pub transcription: String,
    /// 0-100
    pub score: u32,
    #[serde(rename = "phonemeAnalysis")]
    pub phoneme_analysis: Vec<WordAnalysis>,
    pub suggestions: Vec<String>,
    /// True when no real transcript was available and the analysis was made up
    pub simulated: bool,
}

/// Analyse a recognized `transcription` against `target`.
pub fn analyze_phrase(target: &str, transcription: &str) -> PhraseAnalysis {
    let target_lower = target.to_lowercase();
    let heard_lower = transcription.to_lowercase();
    let score = (ratio(&heard_lower, &target_lower) * 100.0) as u32;

    let heard_words: Vec<&str> = heard_lower.split_whitespace().collect();
    let phoneme_analysis = target_lower
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| match heard_words.get(i) {
            Some(heard) if ratio(word, heard) > WORD_MATCH_THRESHOLD => WordAnalysis::good(word),
            Some(heard) => WordAnalysis::misheard(word, heard),
            None => WordAnalysis::not_detected(word),
        })
        .collect();

    PhraseAnalysis {
        transcription: transcription.to_string(),
        score,
        phoneme_analysis,
        suggestions: suggestions_for(score),
        simulated: false,
    }
}

/// Coaching suggestions for a sentence score.
pub fn suggestions_for(score: u32) -> Vec<String> {
    let tips: &[&str] = if score < 60 {
        &[
            "Try speaking more slowly and clearly.",
            "Practice each word individually before saying the full phrase.",
        ]
    } else if score < 80 {
        &[
            "Your pronunciation is good, but try to enunciate more clearly.",
            "Focus on the words that were misheard.",
        ]
    } else {
        &["Excellent pronunciation! Keep practicing to maintain your skills."]
    };
    tips.iter().map(|tip| tip.to_string()).collect()
}
