//! Practice session summary: average the exercise scores and pick tips.

use serde::{Deserialize, Serialize};

use super::AnalysisError;

const STRUGGLING_TIPS: &[&str] = &[
    "Break down words into syllables and practice each part separately",
    "Listen to the correct pronunciation multiple times before attempting",
    "Record yourself and compare with the original audio",
    "Focus on one sound at a time until you master it",
];

const IMPROVING_TIPS: &[&str] = &[
    "Pay attention to the syllables marked as 'needs work'",
    "Practice the challenging sounds in different word contexts",
    "Try speaking more slowly to improve accuracy",
];

const PROFICIENT_TIPS: &[&str] = &[
    "Keep practicing to maintain your progress",
    "Try more challenging words",
    "Work on speaking at a natural pace while maintaining accuracy",
];

/// One finished exercise as reported by the client.
///
/// Clients send whole word-check results back; only the score matters here
/// and every other field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseScore {
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_score: f64,
    pub num_exercises: usize,
    pub improvement_tips: Vec<String>,
}

/// Mean score across a session plus tips for that level.
pub fn summarize_session(results: &[ExerciseScore]) -> Result<SessionSummary, AnalysisError> {
    if results.is_empty() {
        return Err(AnalysisError::NoResults);
    }

    let total_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;

    let tips = if total_score < 60.0 {
        STRUGGLING_TIPS
    } else if total_score < 80.0 {
        IMPROVING_TIPS
    } else {
        PROFICIENT_TIPS
    };

    Ok(SessionSummary {
        total_score,
        num_exercises: results.len(),
        improvement_tips: tips.iter().map(|tip| tip.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[f64]) -> Vec<ExerciseScore> {
        values.iter().map(|&score| ExerciseScore { score }).collect()
    }

    #[test]
    fn test_mean_selects_middle_tier() {
        let summary = summarize_session(&scores(&[100.0, 50.0])).unwrap();
        assert_eq!(summary.total_score, 75.0);
        assert_eq!(summary.num_exercises, 2);
        assert_eq!(summary.improvement_tips, IMPROVING_TIPS);
    }

    #[test]
    fn test_tier_boundaries() {
        let low = summarize_session(&scores(&[59.9])).unwrap();
        assert_eq!(low.improvement_tips.len(), 4);

        let middle = summarize_session(&scores(&[60.0])).unwrap();
        assert_eq!(middle.improvement_tips, IMPROVING_TIPS);

        let high = summarize_session(&scores(&[80.0])).unwrap();
        assert_eq!(high.improvement_tips, PROFICIENT_TIPS);
    }

    #[test]
    fn test_empty_session_is_rejected() {
        assert_eq!(summarize_session(&[]), Err(AnalysisError::NoResults));
    }

    #[test]
    fn test_extra_result_fields_are_ignored() {
        let json = r#"[{"score": 90, "status": "good", "expected": "cat"}, {"score": 70}]"#;
        let results: Vec<ExerciseScore> = serde_json::from_str(json).unwrap();
        let summary = summarize_session(&results).unwrap();
        assert_eq!(summary.total_score, 80.0);
        assert_eq!(summary.improvement_tips, PROFICIENT_TIPS);
    }
}
