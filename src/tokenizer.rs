//! Tokenization.
//!
//! The core treats the tokenizer as an external collaborator with a
//! deterministic `tokenize(text) -> terms` contract; linguistic rules
//! (stopwords, stemming) are intentionally out of scope. `WhitespaceTokenizer`
//! is the one concrete implementation shipped here, used identically at
//! index and query time so normalization never diverges between the two.

use crate::types::Term;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Term>;
}

/// Lowercases and splits on runs of non-alphanumeric characters.
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    case_sensitive: bool,
    min_len: usize,
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        WhitespaceTokenizer {
            case_sensitive: false,
            min_len: 1,
        }
    }
}

impl WhitespaceTokenizer {
    pub fn new(case_sensitive: bool, min_len: usize) -> Self {
        WhitespaceTokenizer {
            case_sensitive,
            min_len,
        }
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Term> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.len() >= self.min_len)
            .map(|s| {
                if self.case_sensitive {
                    s.to_string()
                } else {
                    s.to_lowercase()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_lowercases() {
        let t = WhitespaceTokenizer::default();
        assert_eq!(
            t.tokenize("Christopher Nolan's Movies!"),
            vec!["christopher", "nolan", "s", "movies"]
        );
    }

    #[test]
    fn repeats_counted_by_caller() {
        let t = WhitespaceTokenizer::default();
        assert_eq!(t.tokenize("alpha beta alpha"), vec!["alpha", "beta", "alpha"]);
    }

    #[test]
    fn case_sensitive_variant_preserves_case() {
        let t = WhitespaceTokenizer::new(true, 1);
        assert_eq!(t.tokenize("Alpha alpha"), vec!["Alpha", "alpha"]);
    }
}
