//! TF-IDF vectorizer for transaction descriptions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::analysis::shingle::ShingleBuilder;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::{AngelError, Result};
use crate::ml::sparse::SparseVector;

/// Row normalization applied after IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Scale each row to unit Euclidean length.
    L2,
    /// Leave raw `tf * idf` weights.
    None,
}

/// Configuration for [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Keep only the K most frequent terms. `None` keeps every term.
    pub max_features: Option<usize>,

    /// Smallest and largest n-gram length, in tokens.
    pub ngram_range: (usize, usize),

    /// Regex selecting tokens. `None` splits on whitespace.
    pub token_pattern: Option<String>,

    /// Row normalization.
    pub norm: Norm,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: Some(1000),
            ngram_range: (1, 2),
            token_pattern: None,
            norm: Norm::L2,
        }
    }
}

impl TfIdfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(AngelError::invalid_config("max_features must be at least 1"));
        }
        ShingleBuilder::new(self.ngram_range.0, self.ngram_range.1)?;
        if let Some(pattern) = &self.token_pattern {
            RegexTokenizer::with_pattern(pattern)?;
        }
        Ok(())
    }

    fn tokenizer(&self) -> Result<Arc<dyn Tokenizer>> {
        Ok(match &self.token_pattern {
            Some(pattern) => Arc::new(RegexTokenizer::with_pattern(pattern)?),
            None => Arc::new(WhitespaceTokenizer::new()),
        })
    }
}

/// TF-IDF vectorizer over word unigrams and bigrams.
///
/// `fit` learns the vocabulary and the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1` of every kept term. `transform` then maps
/// text to raw term counts times IDF, optionally L2-normalized. Terms outside
/// the vocabulary are ignored.
///
/// Input is expected to be normalized already; the vectorizer does not
/// change case.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Term -> column index.
    vocabulary: HashMap<String, u32>,
    /// Column index -> term, lexicographically sorted.
    terms: Vec<String>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen during fit.
    n_documents: usize,
    tokenizer: Arc<dyn Tokenizer>,
    shingles: ShingleBuilder,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.terms.len())
            .field("n_documents", &self.n_documents)
            .field("tokenizer", &self.tokenizer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = config.tokenizer()?;
        let shingles = ShingleBuilder::new(config.ngram_range.0, config.ngram_range.1)?;

        Ok(Self {
            config,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
            tokenizer,
            shingles,
        })
    }

    /// Fit the vocabulary and IDF weights on training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(AngelError::model("cannot fit vectorizer on an empty corpus"));
        }

        let mut term_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let terms = self.terms_of(doc)?;
            let unique: AHashSet<&String> = terms.iter().collect();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(AngelError::model("corpus contains no terms"));
        }

        // Most frequent first; equal counts fall back to term order so the cut
        // is independent of hash iteration order.
        let mut ranked: Vec<(String, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(k) = self.config.max_features {
            ranked.truncate(k);
        }

        let mut terms: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = documents.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((n + 1.0) / (df + 1.0)).ln() + 1.0
            })
            .collect();

        self.vocabulary = index_terms(&terms);
        self.terms = terms;
        self.idf = idf;
        self.n_documents = documents.len();

        log::debug!(
            "fitted vectorizer: {} documents, {} terms",
            self.n_documents,
            self.terms.len()
        );

        Ok(())
    }

    /// Transform a document into a TF-IDF feature vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(AngelError::model("vectorizer is not fitted"));
        }

        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for term in self.terms_of(document)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx as usize]))
            .collect();
        let mut vector = SparseVector::from_pairs(self.terms.len(), pairs);
        if self.config.norm == Norm::L2 {
            vector.normalize_l2();
        }

        Ok(vector)
    }

    /// Fit on `documents` and return their vectors.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    fn terms_of(&self, document: &str) -> Result<Vec<String>> {
        let tokens: Vec<Token> = self.tokenizer.tokenize(document)?.collect();
        Ok(self.shingles.build(&tokens))
    }

    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Vocabulary terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&i| self.idf[i as usize])
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }
}

fn index_terms(terms: &[String]) -> HashMap<String, u32> {
    terms
        .iter()
        .enumerate()
        .map(|(i, term)| (term.clone(), i as u32))
        .collect()
}

/// On-disk form of a fitted vectorizer; the runtime parts are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct VectorizerState {
    config: TfIdfConfig,
    terms: Vec<String>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl From<TfIdfVectorizer> for VectorizerState {
    fn from(v: TfIdfVectorizer) -> Self {
        Self {
            config: v.config,
            terms: v.terms,
            idf: v.idf,
            n_documents: v.n_documents,
        }
    }
}

impl TryFrom<VectorizerState> for TfIdfVectorizer {
    type Error = AngelError;

    fn try_from(state: VectorizerState) -> Result<Self> {
        if state.terms.len() != state.idf.len() {
            return Err(AngelError::serialization(format!(
                "vectorizer has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            )));
        }
        let mut vectorizer = TfIdfVectorizer::new(state.config)?;
        vectorizer.vocabulary = index_terms(&state.terms);
        vectorizer.terms = state.terms;
        vectorizer.idf = state.idf;
        vectorizer.n_documents = state.n_documents;
        Ok(vectorizer)
    }
}
