use crate::record::{Record, Value};
use std::cmp::Ordering;
use std::fmt;

/// Which way the target lies from a wrong numeric guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Higher,
    Lower,
}

impl Hint {
    #[must_use]
    pub fn arrow(self) -> char {
        match self {
            Self::Higher => '↑',
            Self::Lower => '↓',
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Higher => f.write_str("higher"),
            Self::Lower => f.write_str("lower"),
        }
    }
}

/// Verdict for one field of one guess.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackEntry {
    pub field: String,
    pub guessed: Option<Value>,
    pub correct: bool,
    pub hint: Option<Hint>,
}

/// Compare `guess` against `target` on each of `fields`, in order.
#[must_use]
pub fn evaluate(target: &Record, guess: &Record, fields: &[&str]) -> Vec<FeedbackEntry> {
    fields
        .iter()
        .map(|&field| {
            let actual = target.get(field);
            let guessed = guess.get(field);
            let (correct, hint) = match actual {
                Some(actual) if actual.is_numeric() => compare_numeric(actual, guessed),
                _ => (compare_text(actual, guessed), None),
            };
            FeedbackEntry {
                field: field.to_string(),
                guessed: guessed.cloned(),
                correct,
                hint,
            }
        })
        .collect()
}

/// Numeric rule: unknown only matches unknown, mismatched numbers point
/// towards the target.
fn compare_numeric(actual: &Value, guessed: Option<&Value>) -> (bool, Option<Hint>) {
    match (actual, guessed) {
        (Value::Unknown, Some(Value::Unknown)) => (true, None),
        (Value::Number(a), Some(Value::Number(g))) => match g.partial_cmp(a) {
            Some(Ordering::Equal) => (true, None),
            Some(Ordering::Less) => (false, Some(Hint::Higher)),
            Some(Ordering::Greater) => (false, Some(Hint::Lower)),
            None => (false, None),
        },
        _ => (false, None),
    }
}

fn compare_text(actual: Option<&Value>, guessed: Option<&Value>) -> bool {
    match (actual, guessed) {
        (Some(a), Some(g)) => a.to_string().to_lowercase() == g.to_string().to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}
