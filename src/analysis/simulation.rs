//! Simulated phrase analysis.
//!
//! When no real transcript can be obtained the speech exercise still returns
//! something the frontend can render: roughly 70% of the words are treated as
//! correct and the rest get a one-letter slip. The result is always flagged
//! with `simulated: true` so callers can tell it apart from a real analysis.

use rand::Rng;

use super::phrase::{suggestions_for, PhraseAnalysis, WordAnalysis};

const CORRECT_PROBABILITY_CUTOFF: f64 = 0.3;

/// Build a made-up analysis of `target` using `rng` for every random choice.
pub fn simulate_analysis<R: Rng + ?Sized>(target: &str, rng: &mut R) -> PhraseAnalysis {
    let target_lower = target.to_lowercase();
    let mut heard_words = Vec::new();
    let mut phoneme_analysis = Vec::new();

    for word in target_lower.split_whitespace() {
        if rng.gen::<f64>() > CORRECT_PROBABILITY_CUTOFF {
            heard_words.push(word.to_string());
            phoneme_analysis.push(WordAnalysis::good(word));
        } else {
            let heard = mishear(word, rng);
            phoneme_analysis.push(WordAnalysis::misheard(word, &heard));
            heard_words.push(heard);
        }
    }

    let correct = phoneme_analysis.iter().filter(|w| w.correct).count();
    let score = if phoneme_analysis.is_empty() {
        0
    } else {
        (correct as f64 / phoneme_analysis.len() as f64 * 100.0) as u32
    };

    PhraseAnalysis {
        transcription: heard_words.join(" "),
        score,
        phoneme_analysis,
        suggestions: suggestions_for(score),
        simulated: true,
    }
}

/// Swap one inner letter of a longer word, or tack a letter onto a short one.
fn mishear<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    let letter = char::from(b'a' + rng.gen_range(0..26u8));

    if chars.len() > 3 {
        let position = rng.gen_range(1..=chars.len() - 2);
        chars[position] = letter;
    } else {
        chars.push(letter);
    }

    chars.into_iter().collect()
}
