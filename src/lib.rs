//! # loan-angel
//!
//! Transaction categorisation and personal cash-flow analysis.
//!
//! A TF-IDF + random forest classifier maps free-text bank transaction
//! descriptions to spending categories. The financial analyzer uses it to
//! total income, expenses and per-category spending for a batch, and the
//! advisor turns that summary into short advice.
//!
//! ## Overview
//!
//! - [`training`] fits a classifier offline and writes a
//!   [`artifact::TrainedArtifact`].
//! - [`classifier::ClassificationService`] loads the artifact lazily and
//!   serves `classify(description) -> Category`.
//! - [`finance`] aggregates classified transactions and produces advice.
//!
//! ```no_run
//! use loan_angel::classifier::ClassificationService;
//! use loan_angel::finance::{FinancialAnalyzer, Transaction};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> loan_angel::error::Result<()> {
//! let service = ClassificationService::from_path("saved_models/expense_classifier.bin");
//! let result = FinancialAnalyzer::new(&service).analyze(&[
//!     Transaction::new("SALARY CREDIT - TCS", Decimal::from(100_000)),
//!     Transaction::new("UPI/SWIGGY", Decimal::from(25_000)),
//! ])?;
//! println!("{}", result.advise()?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod artifact;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod datagen;
pub mod error;
pub mod finance;
pub mod ml;
pub mod training;

pub mod prelude {
    pub use crate::artifact::{ArtifactMetadata, TrainedArtifact};
    pub use crate::classifier::{CategoryClassifier, ClassificationService};
    pub use crate::config::AngelConfig;
    pub use crate::error::{AngelError, ArtifactError, Result};
    pub use crate::finance::{
        Advice, AnalysisResult, Category, CategoryBreakdown, FinancialAnalyzer, Transaction,
        advise,
    };
    pub use crate::training::{LabeledRow, TrainingPipeline};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
