//! Statistical text classification.
//!
//! The pieces mirror a classic "TF-IDF + random forest" pipeline:
//!
//! - [`tfidf::TfIdfVectorizer`] learns a capped unigram/bigram vocabulary with
//!   IDF weights and maps text to a [`sparse::SparseVector`].
//! - [`tree::DecisionTreeClassifier`] is a CART tree grown on Gini impurity.
//! - [`forest::RandomForestClassifier`] bags many trees and takes a majority
//!   vote.
//! - [`split::stratified_split`] and [`metrics::ClassificationReport`] cover
//!   held-out evaluation.
//!
//! Nothing outside this module looks inside the fitted models; callers go
//! through [`crate::classifier::CategoryClassifier`].

pub mod forest;
pub mod labels;
pub mod matrix;
pub mod metrics;
pub mod sparse;
pub mod split;
pub mod tfidf;
pub mod tree;

pub use forest::{ForestConfig, RandomForestClassifier};
pub use labels::LabelEncoder;
pub use metrics::{ClassMetrics, ClassificationReport};
pub use sparse::SparseVector;
pub use split::{StratifiedSplit, stratified_split};
pub use tfidf::{Norm, TfIdfConfig, TfIdfVectorizer};
pub use tree::{DecisionTreeClassifier, MaxFeatures, TreeConfig};
