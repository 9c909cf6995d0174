//! Text scoring — heuristic AI-likelihood and Flesch readability.
//!
//! NOTE: the AI-likelihood number is a display heuristic, not a detector. It has
//! no calibrated ground truth and deliberately includes random noise; never use
//! it to make decisions about a text's origin.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod ai_likelihood;
pub mod readability;

pub use ai_likelihood::estimate_ai_likelihood;
pub use readability::estimate_readability;

/// Source of uniform random noise. Injected so tests can pin exact scores.
pub trait NoiseSource {
    /// Returns a value uniformly distributed in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Adapts any `rand` generator into a `NoiseSource`.
pub struct RngNoise<R>(pub R);

impl<R: Rng> NoiseSource for RngNoise<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.0.random_range(low..=high)
    }
}

/// Scores for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Heuristic pseudo-score in [5, 95].
    pub ai_likelihood: f64,
    pub readability: f64,
}

impl ScoreReport {
    pub fn for_text(text: &str, noise: &mut dyn NoiseSource) -> Self {
        Self {
            ai_likelihood: estimate_ai_likelihood(text, noise),
            readability: estimate_readability(text),
        }
    }
}

/// Before/after scores for a completed rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewriteScores {
    pub before: ScoreReport,
    pub after: ScoreReport,
}

pub fn score_rewrite(original: &str, rewritten: &str, noise: &mut dyn NoiseSource) -> RewriteScores {
    RewriteScores {
        before: ScoreReport::for_text(original, noise),
        after: ScoreReport::for_text(rewritten, noise),
    }
}

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod testing {
    use super::NoiseSource;

    /// Always returns the point at `fraction` of the requested interval.
    pub struct FixedNoise(pub f64);

    impl NoiseSource for FixedNoise {
        fn uniform(&mut self, low: f64, high: f64) -> f64 {
            low + (high - low) * self.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FixedNoise;
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(-3.004), -3.0);
    }

    #[test]
    fn test_rng_noise_stays_in_interval() {
        let mut noise = RngNoise(StdRng::seed_from_u64(7));
        for _ in 0..1_000 {
            let v = noise.uniform(-5.0, 5.0);
            assert!((-5.0..=5.0).contains(&v), "value {v}");
        }
    }

    #[test]
    fn test_score_rewrite_scores_both_texts() {
        let mut noise = FixedNoise(0.5);
        let scores = score_rewrite("Too short.", "Also short.", &mut noise);
        // fewer than ten tokens → midpoint of [30, 70]
        assert_eq!(scores.before.ai_likelihood, 50.0);
        assert_eq!(scores.after.ai_likelihood, 50.0);
        assert!(scores.after.readability.is_finite());
    }
}
