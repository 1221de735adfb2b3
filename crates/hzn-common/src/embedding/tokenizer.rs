use std::collections::BTreeMap;

use crate::normalize::normalize_text;

/// Weighted token ready for feature hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedToken {
    pub token: String,
    pub weight: f32,
}

impl WeightedToken {
    pub fn new(token: impl Into<String>, weight: f32) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

const MIN_TOKEN_CHARS: usize = 2;

/// Tokenize prose (a project objective or a proposal) into weighted terms.
///
/// Terms are NFKC-lowercased alphanumeric words of at least two characters;
/// the weight is a sublinear term frequency (1 + ln tf) so a word repeated
/// through a long abstract does not drown out the rest of the vocabulary.
/// Output is sorted by term so downstream float accumulation is
/// order-stable across runs.
pub fn tokenize_text(text: &str) -> Vec<WeightedToken> {
    let normalized = normalize_text(text);

    // BTreeMap rather than HashMap: iteration order is part of the
    // determinism contract for the hashed embedding.
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for term in normalized.split(|c: char| !c.is_alphanumeric()) {
        if term.chars().count() < MIN_TOKEN_CHARS {
            continue;
        }
        *counts.entry(term).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(term, count)| WeightedToken::new(term, 1.0 + (count as f32).ln()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_drops_short_terms() {
        let tokens = tokenize_text("CO2 capture, re-use & storage");
        let terms: Vec<&str> = tokens.iter().map(|t| t.token.as_str()).collect();
        assert_eq!(terms, vec!["capture", "co2", "re", "storage", "use"]);
    }

    #[test]
    fn repeated_terms_get_sublinear_weight() {
        let tokens = tokenize_text("cells cells cells membrane");
        let cells = tokens.iter().find(|t| t.token == "cells").unwrap();
        let membrane = tokens.iter().find(|t| t.token == "membrane").unwrap();

        assert!(cells.weight > membrane.weight);
        assert!((membrane.weight - 1.0).abs() < f32::EPSILON);
        assert!((cells.weight - (1.0 + 3f32.ln())).abs() < 1e-6);
    }

    #[test]
    fn output_is_sorted_and_deterministic() {
        let a = tokenize_text("ocean plastic waste ocean");
        let b = tokenize_text("ocean plastic waste ocean");
        assert_eq!(a, b);

        let terms: Vec<&str> = a.iter().map(|t| t.token.as_str()).collect();
        let mut sorted = terms.clone();
        sorted.sort_unstable();
        assert_eq!(terms, sorted);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize_text("").is_empty());
        assert!(tokenize_text("  . ,; ").is_empty());
    }
}
