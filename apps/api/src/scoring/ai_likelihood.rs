use std::collections::HashSet;

use super::{round2, NoiseSource};

/// Below this many whitespace tokens the text carries no usable signal.
const MIN_TOKENS: usize = 10;
const BASE_SCORE: f64 = 50.0;
const UNIQUE_RATIO_WEIGHT: f64 = 30.0;
const SENTENCE_LENGTH_CAP: f64 = 50.0;
const SENTENCE_LENGTH_DIVISOR: f64 = 10.0;
const NOISE_AMPLITUDE: f64 = 5.0;
const SCORE_FLOOR: f64 = 5.0;
const SCORE_CEILING: f64 = 95.0;

/// Heuristic "AI-likelihood" pseudo-score in [5, 95].
///
/// score = 50 + unique_ratio·30 + min(chars / (terminators + 1), 50) / 10 ± 5
///
/// Texts with fewer than 10 tokens get a uniform value in [30, 70].
/// Not a detector: the number is noisy by construction.
pub fn estimate_ai_likelihood(text: &str, noise: &mut dyn NoiseSource) -> f64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return round2(noise.uniform(30.0, 70.0));
    }

    let distinct: HashSet<&str> = tokens.iter().copied().collect();
    let unique_ratio = distinct.len() as f64 / tokens.len() as f64;

    let terminators = text.chars().filter(|c| matches!(c, '.' | '!' | '?')).count();
    let avg_sentence_length = text.chars().count() as f64 / (terminators + 1) as f64;

    let score = BASE_SCORE
        + unique_ratio * UNIQUE_RATIO_WEIGHT
        + avg_sentence_length.min(SENTENCE_LENGTH_CAP) / SENTENCE_LENGTH_DIVISOR;

    let perturbed = score + noise.uniform(-NOISE_AMPLITUDE, NOISE_AMPLITUDE);
    round2(perturbed.clamp(SCORE_FLOOR, SCORE_CEILING))
}
