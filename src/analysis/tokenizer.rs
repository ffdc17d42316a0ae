//! Tokenizers that split normalized descriptions into tokens.
//!
//! - [`whitespace::WhitespaceTokenizer`] - splits on whitespace (the default)
//! - [`regex::RegexTokenizer`] - keeps every match of a configured pattern
//!
//! The choice is recorded in the trained artifact, so serving always splits
//! text the same way training did.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// ```
/// use loan_angel::analysis::tokenizer::Tokenizer;
/// use loan_angel::analysis::tokenizer::whitespace::WhitespaceTokenizer;
///
/// let tokenizer = WhitespaceTokenizer::new();
/// let tokens: Vec<_> = tokenizer.tokenize("netflix sub").unwrap().collect();
/// assert_eq!(tokens[0].text, "netflix");
/// assert_eq!(tokens[1].text, "sub");
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and logging).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod whitespace;
