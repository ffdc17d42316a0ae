//! Rule-based advice from a batch summary.
//!
//! Two fixed rules, evaluated independently and reported in this order:
//!
//! 1. A surplus above ₹10,000 suggests prepaying a loan.
//! 2. Food above 30% of total expenses (every category except Salary) gets a
//!    warning. Skipped when total expenses are zero or negative.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finance::breakdown::CategoryBreakdown;
use crate::finance::transaction::Category;

/// Surplus above which prepayment is suggested.
pub const SURPLUS_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Food share of expenses above which a warning is raised.
pub const FOOD_SHARE: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

const FOOD_WARNING: &str = "Warning: High spending on Food this month.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceRule {
    PrepayLoan,
    HighFoodSpending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceItem {
    pub rule: AdviceRule,
    pub message: String,
}

/// Ordered advice messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub items: Vec<AdviceItem>,
}

impl Advice {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn fired(&self, rule: AdviceRule) -> bool {
        self.items.iter().any(|item| item.rule == rule)
    }

    /// Messages joined by a single space; empty when no rule fired.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|item| item.message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Round to two places for display. `Display` on `Decimal` truncates.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Evaluate both rules. Pure: the same inputs always give the same advice.
///
/// Fails only when the expense total does not fit in a `Decimal`.
pub fn advise(surplus: Decimal, breakdown: &CategoryBreakdown) -> Result<Advice> {
    let mut items = Vec::new();

    if surplus > SURPLUS_THRESHOLD {
        items.push(AdviceItem {
            rule: AdviceRule::PrepayLoan,
            message: format!(
                "You have ₹{:.2} extra! Prepay this to your loan to save interest.",
                round_money(surplus)
            ),
        });
    }

    let total_expenses = breakdown.total_excluding(Category::SALARY)?;
    if total_expenses > Decimal::ZERO {
        let food = breakdown.get(Category::FOOD).unwrap_or(Decimal::ZERO);
        // a quotient too large for Decimal is far above the threshold
        let high = match food.checked_div(total_expenses) {
            Some(share) => share > FOOD_SHARE,
            None => food > Decimal::ZERO,
        };
        if high {
            items.push(AdviceItem {
                rule: AdviceRule::HighFoodSpending,
                message: FOOD_WARNING.to_string(),
            });
        }
    }

    Ok(Advice { items })
}
