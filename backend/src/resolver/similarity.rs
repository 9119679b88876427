//! String similarity metrics for header matching.
//!
//! Every metric works on [`normalize`]d text and returns a score in
//! `0.0..=1.0`, where `1.0` means the normalized strings are identical.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// Lowercase, turn punctuation and underscores into spaces, collapse runs.
///
/// `"Price (List)"`, `"price_list"` and `" PRICE  list "` all normalize to
/// `"price list"`.
pub fn normalize(s: &str) -> String {
    SEPARATORS
        .replace_all(&s.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// A header similarity metric.
pub trait Similarity {
    /// Score how close a source header is to a known alias.
    fn score(&self, header: &str, alias: &str) -> f64;
}

/// Available metrics, selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    /// Word-order-insensitive LCS ratio.
    #[default]
    TokenSort,
    /// Normalized edit distance.
    Levenshtein,
}

impl SimilarityKind {
    /// Instantiate the metric.
    pub fn build(self) -> Box<dyn Similarity> {
        match self {
            SimilarityKind::TokenSort => Box::new(TokenSortRatio),
            SimilarityKind::Levenshtein => Box::new(NormalizedLevenshtein),
        }
    }
}

/// Sorts the words of both strings, then scores `2 * LCS / (len_a + len_b)`.
///
/// Word order does not matter, so `"Price (List)"` matches `"List Price"`
/// exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn score(&self, header: &str, alias: &str) -> f64 {
        let a = sorted_tokens(header);
        let b = sorted_tokens(alias);
        ratio(&a, &b)
    }
}

/// `1 - distance / max_len` over normalized strings, word order kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn score(&self, header: &str, alias: &str) -> f64 {
        let a: Vec<char> = normalize(header).chars().collect();
        let b: Vec<char> = normalize(alias).chars().collect();
        let max_len = a.len().max(b.len());
        if max_len == 0 {
            return 0.0;
        }
        1.0 - levenshtein_distance(&a, &b) as f64 / max_len as f64
    }
}

fn sorted_tokens(s: &str) -> Vec<char> {
    let normalized = normalize(s);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ").chars().collect()
}

/// `2 * LCS / (len_a + len_b)`; two empty strings score 0.
fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    2.0 * longest_common_subsequence(a, b) as f64 / total as f64
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn levenshtein_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Price (List)"), "price list");
        assert_eq!(normalize("list_price"), "list price");
        assert_eq!(normalize("  Weight   (lbs.) "), "weight lbs");
        assert_eq!(normalize("Größe"), "größe");
    }

    #[test]
    fn test_token_sort_tolerates_naming_variants() {
        let m = TokenSortRatio;
        assert_eq!(m.score("List Price", "List Price"), 1.0);
        assert_eq!(m.score("list_price", "List Price"), 1.0);
        assert_eq!(m.score("Price (List)", "List Price"), 1.0);
    }

    #[test]
    fn test_token_sort_partial_match() {
        let m = TokenSortRatio;
        // "weight" vs "lbs weight": LCS 6, lengths 6 + 10
        assert!((m.score("Weight", "Weight lbs") - 0.75).abs() < 1e-9);
        assert!(m.score("Voltage", "Vendor") < 0.7);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(TokenSortRatio.score("", ""), 0.0);
        assert_eq!(NormalizedLevenshtein.score("", ""), 0.0);
        assert_eq!(TokenSortRatio.score("", "SKU"), 0.0);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein_distance(&chars(""), &chars("abc")), 3);

        let m = NormalizedLevenshtein;
        assert_eq!(m.score("SKU", "sku"), 1.0);
        // "part no" vs "part number": 5 edits over 11 chars
        assert!((m.score("Part No", "Part Number") - (1.0 - 5.0 / 11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_lcs() {
        assert_eq!(longest_common_subsequence(&chars("abcde"), &chars("ace")), 3);
        assert_eq!(longest_common_subsequence(&chars("abc"), &chars("xyz")), 0);
    }

    #[test]
    fn test_kind_builds_metric() {
        let metric = SimilarityKind::Levenshtein.build();
        assert_eq!(metric.score("Title", "title"), 1.0);
        assert_eq!(SimilarityKind::default(), SimilarityKind::TokenSort);
    }
}
