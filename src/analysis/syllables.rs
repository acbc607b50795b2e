//! Heuristic syllable splitting.
//!
//! A syllable here is "everything up to and including a run of vowels". The
//! trailing consonants of a word are folded into its last syllable. This is
//! not a linguistic model; it only needs to produce stable chunks that line up
//! well enough between an expected word and what the recognizer heard.

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Split a lowercase, trimmed word into syllable chunks.
///
/// Concatenating the result always gives back `word`. A non-empty word yields
/// at least one chunk; a word without vowels comes back whole.
///
/// ```ignore
/// assert_eq!(syllabify("hello"), vec!["he", "llo"]);
/// assert_eq!(syllabify("ssh"), vec!["ssh"]);
/// ```
pub fn syllabify(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut syllables: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);

        // A vowel followed by a consonant always closes here, so a consonant
        // never lands after an open vowel and only extends the buffer.
        if is_vowel(c) {
            let at_end = i + 1 == chars.len();
            if at_end || !is_vowel(chars[i + 1]) {
                syllables.push(std::mem::take(&mut current));
            }
        }
    }

    if !current.is_empty() {
        match syllables.last_mut() {
            Some(last) => last.push_str(&current),
            None => syllables.push(current),
        }
    }

    syllables
}
