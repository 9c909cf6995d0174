use super::round2;

/// Flesch Reading Ease:
/// 206.835 − 1.015·(words / sentences) − 84.6·(syllables / words)
///
/// Returns 0.0 when the text has no words. Results are unbounded; very dense
/// text goes negative and monosyllabic text exceeds 100.
pub fn estimate_readability(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return 0.0;
    }

    let sentences = count_sentences(text).max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;

    if score.is_finite() {
        round2(score)
    } else {
        0.0
    }
}

/// Lower-cases and strips everything but letters, digits and apostrophes.
fn normalize_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Counts runs of text terminated by `.`, `!` or `?` that contain at least one word.
fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .count()
}

/// Vowel-group syllable estimate, at least one per word.
fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return 1;
    }
    if !letters.iter().all(char::is_ascii_alphabetic) {
        // Non-Latin scripts: approximate with one syllable per three letters.
        return letters.len().div_ceil(3).max(1);
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let n = letters.len();
    // silent trailing "e", but not "-le" as in "table"
    if n > 2 && letters[n - 1] == 'e' && !is_vowel(letters[n - 2]) && letters[n - 2] != 'l' {
        count -= 1;
    }

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(estimate_readability(""), 0.0);
        assert_eq!(estimate_readability("   \n\t"), 0.0);
        assert_eq!(estimate_readability("... !!! ???"), 0.0);
    }

    #[test]
    fn test_english_prose_is_finite_and_plausible() {
        let prose = "The cat sat on the mat. It was a sunny day. \
            Children played in the park while their parents watched from the benches.";
        let score = estimate_readability(prose);
        assert!(score.is_finite());
        assert!(score > 50.0 && score < 120.0, "score {score}");
    }

    #[test]
    fn test_dense_text_scores_lower_than_simple_text() {
        let simple = "I see the dog. The dog sees me. We run.";
        let dense = "Institutional considerations necessitate comprehensive organizational \
            restructuring notwithstanding unprecedented administrative complications.";
        assert!(estimate_readability(simple) > estimate_readability(dense));
    }

    #[test]
    fn test_exact_value_for_short_sentences() {
        // 10 words, 3 sentences, 10 syllables
        assert_eq!(estimate_readability("I see the dog. The dog sees me. We run."), 118.85);
    }

    #[test]
    fn test_syllable_counts() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("the"), 1);
    }

    #[test]
    fn test_sentence_count_ignores_empty_segments() {
        assert_eq!(count_sentences("One. Two!! Three?"), 3);
        assert_eq!(count_sentences("No terminator"), 1);
    }
}
