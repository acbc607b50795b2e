//! Built-in speech exercise catalog.
//!
//! A fixed list until exercises come from a real store; filters are exact,
//! case-sensitive matches on the query values.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub id: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub difficulty: &'static str,
    pub category: &'static str,
}

const EXERCISES: &[Exercise] = &[
    Exercise {
        id: "ex1",
        title: "Basic Greeting",
        text: "Hello, how are you today?",
        difficulty: "easy",
        category: "general",
    },
    Exercise {
        id: "ex2",
        title: "Weather Description",
        text: "It's a beautiful sunny day outside.",
        difficulty: "medium",
        category: "general",
    },
    Exercise {
        id: "ex3",
        title: "Medical Appointment",
        text: "I need to schedule a doctor's appointment.",
        difficulty: "medium",
        category: "medical",
    },
    Exercise {
        id: "ex4",
        title: "Emergency Phrase",
        text: "I need help immediately, please.",
        difficulty: "easy",
        category: "emergency",
    },
    Exercise {
        id: "ex5",
        title: "Complex Sentence",
        text: "The quick brown fox jumps over the lazy dog.",
        difficulty: "hard",
        category: "general",
    },
];

/// Exercises matching both filters; a `None` filter matches everything.
pub fn list_exercises(difficulty: Option<&str>, category: Option<&str>) -> Vec<Exercise> {
    EXERCISES
        .iter()
        .filter(|ex| difficulty.map_or(true, |d| ex.difficulty == d))
        .filter(|ex| category.map_or(true, |c| ex.category == c))
        .cloned()
        .collect()
}
