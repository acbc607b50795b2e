//! Character-level similarity ratio.
//!
//! Implements the Ratcliff/Obershelp "gestalt" measure: find the longest common
//! contiguous block, then recurse on whatever lies to its left and right. The
//! ratio is `2 * matched / (len(a) + len(b))`, so identical strings score 1.0
//! and strings with no character in common score 0.0. This is not an edit
//! distance; transpositions cost more than they would under Levenshtein.
//!
//! Once `b` reaches [`AUTOJUNK_MIN_LEN`] characters, characters that make up
//! more than 1% of it are "popular": they cannot seed a match, only extend
//! one found on rarer characters. Long sentences full of spaces and vowels
//! score lower as a result, exactly as Python's `difflib` does.

use std::collections::{HashMap, HashSet};

/// Length of `b` from which popular characters stop seeding matches.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Similarity of two strings in `[0.0, 1.0]`, compared per Unicode scalar.
///
/// Two empty strings are considered identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let popular = popular_chars(&b);
    2.0 * matched_chars(&a, &b, &popular) as f64 / total as f64
}

/// Characters occurring more than `len / 100 + 1` times in a long `b`.
fn popular_chars(b: &[char]) -> HashSet<char> {
    if b.len() < AUTOJUNK_MIN_LEN {
        return HashSet::new();
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for &c in b {
        *counts.entry(c).or_default() += 1;
    }
    let limit = b.len() / 100 + 1;
    counts
        .into_iter()
        .filter(|&(_, count)| count > limit)
        .map(|(c, _)| c)
        .collect()
}

/// Total size of all matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char], popular: &HashSet<char>) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, popular, (alo, ahi), (blo, bhi));
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest block with `a[i..i+size] == b[j..j+size]` inside the given window.
///
/// Ties go to the block ending earliest in `a`, then earliest in `b`. Only
/// non-popular characters seed a block; the block is then widened on both
/// sides over equal characters, popular or not.
fn longest_match(
    a: &[char],
    b: &[char],
    popular: &HashSet<char>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // current[k + 1]: length of the common run ending at a[i] and b[blo + k]
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo;
            current[k + 1] = if a[i] == b[j] && !popular.contains(&b[j]) {
                previous[k] + 1
            } else {
                0
            };
            let size = current[k + 1];
            if size > best_size {
                best_i = i + 1 - size;
                best_j = j + 1 - size;
                best_size = size;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_size += 1;
    }
    while best_i + best_size < ahi
        && best_j + best_size < bhi
        && a[best_i + best_size] == b[best_j + best_size]
    {
        best_size += 1;
    }

    (best_i, best_j, best_size)
}
