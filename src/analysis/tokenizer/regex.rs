//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{AngelError, Result};

/// A tokenizer that keeps every match of a regular expression.
///
/// `RegexTokenizer::with_pattern(r"(?u)\b\w\w+\b")` reproduces the classic
/// "two or more word characters" token rule.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| AngelError::invalid_config(format!("Invalid token pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_pattern() {
        let tokenizer = RegexTokenizer::with_pattern(r"(?u)\b\w\w+\b").unwrap();
        let tokens: Vec<String> = tokenizer
            .tokenize("upi/swiggy - a order")
            .unwrap()
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["upi", "swiggy", "order"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = RegexTokenizer::with_pattern("(unclosed");
        assert!(matches!(result, Err(AngelError::InvalidConfig(_))));
    }

    #[test]
    fn test_pattern_accessor() {
        let tokenizer = RegexTokenizer::with_pattern(r"\S+").unwrap();
        assert_eq!(tokenizer.pattern(), r"\S+");
        assert_eq!(tokenizer.name(), "regex");
    }
}
