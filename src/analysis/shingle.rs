//! Word n-gram ("shingle") construction.

use crate::analysis::token::Token;
use crate::error::{AngelError, Result};

/// Builds contiguous word n-grams from a token sequence.
///
/// Each n-gram is its tokens joined by a single space, so `(1, 2)` over
/// `["netflix", "sub"]` yields `netflix`, `sub` and `netflix sub`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShingleBuilder {
    min_n: usize,
    max_n: usize,
}

impl ShingleBuilder {
    /// Create a builder for n-grams of `min_n..=max_n` tokens.
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 {
            return Err(AngelError::invalid_config("min n-gram size must be at least 1"));
        }
        if max_n < min_n {
            return Err(AngelError::invalid_config(format!(
                "max n-gram size ({max_n}) must be >= min n-gram size ({min_n})"
            )));
        }
        Ok(Self { min_n, max_n })
    }

    /// Unigrams and bigrams.
    pub fn unigrams_and_bigrams() -> Self {
        Self { min_n: 1, max_n: 2 }
    }

    pub fn min_n(&self) -> usize {
        self.min_n
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Produce all n-grams, shortest first, each group in token order.
    pub fn build(&self, tokens: &[Token]) -> Vec<String> {
        let mut grams = Vec::new();
        for n in self.min_n..=self.max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let gram = window
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                grams.push(gram);
            }
        }
        grams
    }
}
