//! Aggregation of classified transactions into income, expenses and surplus.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::CategoryClassifier;
use crate::error::{AngelError, Result};
use crate::finance::advisor::{Advice, advise};
use crate::finance::breakdown::CategoryBreakdown;
use crate::finance::transaction::{ClassifiedTransaction, Transaction};

/// Summary of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub income: Decimal,
    pub expenses: Decimal,
    /// Always `income - expenses`.
    pub surplus: Decimal,
    pub breakdown: CategoryBreakdown,
}

impl AnalysisResult {
    pub fn advise(&self) -> Result<Advice> {
        advise(self.surplus, &self.breakdown)
    }
}

/// Classifies transactions and summarizes them.
pub struct FinancialAnalyzer<'a, C: CategoryClassifier + ?Sized> {
    classifier: &'a C,
}

impl<'a, C: CategoryClassifier + ?Sized> FinancialAnalyzer<'a, C> {
    pub fn new(classifier: &'a C) -> Self {
        Self { classifier }
    }

    /// Classify every transaction, in input order. The first classification
    /// error aborts the batch.
    pub fn classify_all(&self, transactions: &[Transaction]) -> Result<Vec<ClassifiedTransaction>> {
        transactions
            .iter()
            .map(|transaction| {
                Ok(ClassifiedTransaction {
                    category: self.classifier.classify(&transaction.description)?,
                    transaction: transaction.clone(),
                })
            })
            .collect()
    }

    /// Classify and summarize. An empty batch gives an all-zero result.
    pub fn analyze(&self, transactions: &[Transaction]) -> Result<AnalysisResult> {
        let classified = self.classify_all(transactions)?;
        log::debug!(
            "classified {} transactions with {}",
            classified.len(),
            self.classifier.name()
        );
        summarize(&classified)
    }
}

/// Fold classified transactions into an [`AnalysisResult`]. Salary counts as
/// income, every other category as an expense; amounts are used as given.
///
/// Totals that do not fit in a `Decimal` are rejected as invalid input.
pub fn summarize(classified: &[ClassifiedTransaction]) -> Result<AnalysisResult> {
    let mut result = AnalysisResult::default();
    for item in classified {
        let amount = item.transaction.amount;
        result.breakdown.accumulate(&item.category, amount)?;
        let side = if item.category.is_income() {
            &mut result.income
        } else {
            &mut result.expenses
        };
        *side = side
            .checked_add(amount)
            .ok_or_else(|| AngelError::invalid_input("amount overflow"))?;
    }
    result.surplus = result
        .income
        .checked_sub(result.expenses)
        .ok_or_else(|| AngelError::invalid_input("amount overflow"))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AngelError;
    use crate::finance::transaction::Category;

    struct PrefixClassifier;

    impl CategoryClassifier for PrefixClassifier {
        fn classify(&self, description: &str) -> Result<Category> {
            let d = description.to_lowercase();
            Ok(Category::new(if d.contains("salary") {
                "Salary"
            } else if d.contains("swiggy") {
                "Food"
            } else if d.contains("boom") {
                return Err(AngelError::model("boom"));
            } else {
                "Shopping"
            }))
        }

        fn name(&self) -> &str {
            "prefix"
        }
    }

    #[test]
    fn test_empty_batch() {
        let result = FinancialAnalyzer::new(&PrefixClassifier).analyze(&[]).unwrap();
        assert_eq!(result, AnalysisResult::default());
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_income_and_expenses() {
        let txs = vec![
            Transaction::new("SALARY CREDIT", Decimal::from(50000)),
            Transaction::new("UPI/SWIGGY", Decimal::new(45050, 2)),
            Transaction::new("ZARA", Decimal::from(-200)),
        ];
        let result = FinancialAnalyzer::new(&PrefixClassifier).analyze(&txs).unwrap();
        assert_eq!(result.income, Decimal::from(50000));
        assert_eq!(result.expenses, Decimal::new(25050, 2));
        assert_eq!(result.surplus, result.income - result.expenses);
        assert_eq!(result.breakdown.total().unwrap(), result.income + result.expenses);
        assert_eq!(result.breakdown.get("Shopping"), Some(Decimal::from(-200)));
    }

    #[test]
    fn test_classification_error_aborts() {
        let txs = vec![
            Transaction::new("UPI/SWIGGY", Decimal::ONE),
            Transaction::new("BOOM", Decimal::ONE),
        ];
        assert!(FinancialAnalyzer::new(&PrefixClassifier).analyze(&txs).is_err());
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let txs = vec![
            Transaction::new("ZARA", Decimal::ONE),
            Transaction::new("salary", Decimal::ONE),
        ];
        let classified = FinancialAnalyzer::new(&PrefixClassifier)
            .classify_all(&txs)
            .unwrap();
        assert_eq!(classified[0].category.as_str(), "Shopping");
        assert_eq!(classified[1].category.as_str(), "Salary");
        assert_eq!(classified[1].transaction, txs[1]);
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let huge = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
        let txs = vec![
            Transaction::new("UPI/SWIGGY", huge),
            Transaction::new("UPI/SWIGGY", huge),
        ];
        let err = FinancialAnalyzer::new(&PrefixClassifier).analyze(&txs).unwrap_err();
        assert!(matches!(err, AngelError::InvalidInput(_)));

        // income and expenses each fit, the surplus does not
        let txs = vec![
            Transaction::new("SALARY CREDIT", huge),
            Transaction::new("ZARA", -huge),
        ];
        let err = FinancialAnalyzer::new(&PrefixClassifier).analyze(&txs).unwrap_err();
        assert!(matches!(err, AngelError::InvalidInput(_)));
    }

    #[test]
    fn test_large_food_amount_gets_advice() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let result = FinancialAnalyzer::new(&PrefixClassifier)
            .analyze(&[Transaction::new("UPI/SWIGGY", huge)])
            .unwrap();
        let advice = result.advise().unwrap();
        assert_eq!(advice.text(), "Warning: High spending on Food this month.");
    }
}
