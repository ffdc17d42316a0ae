//! Text analysis for transaction descriptions.
//!
//! Descriptions go through three steps before they reach the feature
//! extractor: [`normalizer::normalize`] canonicalizes the raw string, a
//! [`tokenizer::Tokenizer`] splits it into tokens, and
//! [`shingle::ShingleBuilder`] turns the tokens into unigram and bigram terms.
//! Training and serving share these exact steps.

pub mod normalizer;
pub mod shingle;
pub mod token;
pub mod tokenizer;

pub use normalizer::normalize;
pub use shingle::ShingleBuilder;
pub use token::{Token, TokenStream};
pub use tokenizer::Tokenizer;
