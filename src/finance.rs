//! Cash-flow analysis over classified transactions.
//!
//! [`analyzer::FinancialAnalyzer`] classifies each transaction through a
//! [`CategoryClassifier`](crate::classifier::CategoryClassifier) and
//! aggregates income, expenses and the per-category
//! [`breakdown::CategoryBreakdown`]. [`advisor::advise`] turns the result into
//! advice messages.
//!
//! All amounts are [`rust_decimal::Decimal`], so `surplus == income -
//! expenses` holds exactly.

pub mod advisor;
pub mod analyzer;
pub mod breakdown;
pub mod transaction;

pub use advisor::{Advice, AdviceItem, AdviceRule, advise};
pub use analyzer::{AnalysisResult, FinancialAnalyzer, summarize};
pub use breakdown::CategoryBreakdown;
pub use transaction::{
    AnalysisResponse, AnalyzeRequest, Category, ClassifiedTransaction, PredictRequest,
    PredictResponse, Transaction,
};
