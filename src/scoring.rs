//! Deterministic scoring of a transcript against its reference text.
//!
//! Both strings are normalized with [`normalize`], compared with
//! [`edit_distance`] and the distance is turned into a similarity score in
//! `[0.0, 100.0]` relative to the longer of the two normalized strings.
//! Everything here is pure and total: no input can make scoring fail.

use serde::{Deserialize, Serialize};

/// Lower bound of the similarity score.
pub const MIN_SCORE: f64 = 0.0;

/// Upper bound of the similarity score.
pub const MAX_SCORE: f64 = 100.0;

/// Canonical form used before comparison: lowercase, trimmed, and with every
/// run of whitespace collapsed into a single space.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein distance between `a` and `b` with unit costs for insertion,
/// deletion and substitution.
///
/// Characters are Unicode scalar values, so a multi-byte letter counts as a
/// single edit.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    let width = m + 1;

    // table[i * width + j] is the distance between a[..i] and b[..j].
    let mut table = vec![0usize; (n + 1) * width];
    for i in 0..=n {
        table[i * width] = i;
    }
    for j in 0..=m {
        table[j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let deletion = table[(i - 1) * width + j] + 1;
            let insertion = table[i * width + j - 1] + 1;
            let substitution = table[(i - 1) * width + j - 1] + cost;
            table[i * width + j] = deletion.min(insertion).min(substitution);
        }
    }

    table[n * width + m]
}

/// Similarity score of `transcribed` against `reference`, in `[0, 100]`
/// with two decimals.
///
/// Two strings that normalize to empty score `0.00`, not `100.00`.
pub fn score(reference: &str, transcribed: &str) -> f64 {
    ScoreResult::compute(reference, transcribed).score
}

/// Outcome of scoring one transcript. Keeps the raw inputs for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub reference_text: String,
    pub transcribed_text: String,
    /// Edit distance between the normalized texts.
    pub distance: usize,
    /// Character count of the longer normalized text.
    pub max_len: usize,
    pub score: f64,
}

impl ScoreResult {
    pub fn compute(reference: &str, transcribed: &str) -> Self {
        let normalized_reference = normalize(reference);
        let normalized_transcribed = normalize(transcribed);

        let distance = edit_distance(&normalized_reference, &normalized_transcribed);
        let max_len = normalized_reference
            .chars()
            .count()
            .max(normalized_transcribed.chars().count());

        let score = if max_len == 0 {
            MIN_SCORE
        } else {
            let similarity = (1.0 - distance as f64 / max_len as f64) * 100.0;
            round_two_decimals(similarity.clamp(MIN_SCORE, MAX_SCORE))
        };

        Self {
            reference_text: reference.to_string(),
            transcribed_text: transcribed.to_string(),
            distance,
            max_len,
            score,
        }
    }
}

// Half away from zero, the behaviour of `f64::round`.
fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
