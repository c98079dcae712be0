use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Two keywords belong to the same topical cluster once their score
/// reaches this value.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Any shared word is taken as a strong topical signal on top of the
/// plain set overlap.
const EXACT_MATCH_BOOST: f64 = 0.3;

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, decompose, strip diacritics and punctuation, tokenize.
fn word_set(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Lexical similarity in [0, 1]: word-set Jaccard plus a flat boost
/// when at least one word matches exactly. Symmetric and deterministic
/// for fixed inputs.
pub fn word_overlap_similarity(a: &str, b: &str) -> f64 {
    let words_a = word_set(a);
    let words_b = word_set(b);

    let score = jaccard(&words_a, &words_b);
    let boost = if words_a.intersection(&words_b).next().is_some() {
        EXACT_MATCH_BOOST
    } else {
        0.0
    };
    (score + boost).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_keywords_cross_the_threshold() {
        let s = word_overlap_similarity("running shoes", "shoes for running");
        assert!(s >= SIMILARITY_THRESHOLD, "score was {s}");
    }

    #[test]
    fn unrelated_keywords_stay_below_the_threshold() {
        let s = word_overlap_similarity("running shoes", "blue socks");
        assert!(s < SIMILARITY_THRESHOLD, "score was {s}");
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("running shoes", "shoes for running"),
            ("best trail shoes", "trail running"),
            ("sapatilhas de corrida", "corrida"),
        ];
        for (a, b) in pairs {
            assert_eq!(word_overlap_similarity(a, b), word_overlap_similarity(b, a));
        }
    }

    #[test]
    fn identical_keywords_score_one() {
        assert_eq!(word_overlap_similarity("running shoes", "running shoes"), 1.0);
    }

    #[test]
    fn diacritics_are_ignored() {
        assert_eq!(word_overlap_similarity("tênis corrida", "tenis corrida"), 1.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(word_overlap_similarity("", "running shoes"), 0.0);
        assert_eq!(word_overlap_similarity("", ""), 0.0);
    }
}
