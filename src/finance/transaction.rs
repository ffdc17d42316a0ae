//! Transactions, categories and the request/response shapes around them.

use std::borrow::Borrow;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};
use crate::finance::advisor::Advice;
use crate::finance::analyzer::AnalysisResult;
use crate::finance::breakdown::CategoryBreakdown;

/// Advice text used when no rule fires.
pub const NO_ADVICE: &str = "No specific advice at this time.";

/// A category label from the trained label set.
///
/// The set itself comes from the training data. Only [`Category::SALARY`]
/// has a fixed meaning: it marks income.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub const SALARY: &'static str = "Salary";
    pub const FOOD: &'static str = "Food";

    pub fn new<S: Into<String>>(label: S) -> Self {
        Category(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_income(&self) -> bool {
        self.0 == Self::SALARY
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::new(label)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category(label)
    }
}

/// One bank transaction. The sign of `amount` is not interpreted; the
/// category alone decides income versus expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Decimal,
}

impl Transaction {
    pub fn new<S: Into<String>>(description: S, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// A transaction with the category it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Category,
}

/// `{"transactions": [{"description": ..., "amount": ...}, ...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl AnalyzeRequest {
    /// Reject an empty batch or a transaction without a description.
    pub fn validate(&self) -> Result<()> {
        if self.transactions.is_empty() {
            return Err(AngelError::invalid_input("No transactions provided"));
        }
        if let Some(i) = self
            .transactions
            .iter()
            .position(|t| t.description.trim().is_empty())
        {
            return Err(AngelError::invalid_input(format!(
                "transaction {i} has no description"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub description: String,
}

impl PredictRequest {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(AngelError::invalid_input("No description provided"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub description: String,
    pub category: Category,
}

/// Analysis result plus advice, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub total_savings: Decimal,
    pub income: Decimal,
    pub expenses: Decimal,
    pub category_breakdown: CategoryBreakdown,
    pub advice: String,
}

impl AnalysisResponse {
    pub fn new(result: AnalysisResult, advice: &Advice) -> Self {
        let advice = if advice.is_empty() {
            NO_ADVICE.to_string()
        } else {
            advice.text()
        };
        Self {
            total_savings: result.surplus,
            income: result.income,
            expenses: result.expenses,
            category_breakdown: result.breakdown,
            advice,
        }
    }
}
