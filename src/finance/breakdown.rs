//! Per-category totals for one batch of transactions.

use std::collections::HashMap;
use std::collections::hash_map;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};
use crate::finance::transaction::Category;

/// Category -> accumulated amount.
///
/// Entries are created on first use and added to afterwards. Iteration order
/// is unspecified and equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryBreakdown {
    totals: HashMap<Category, Decimal>,
}

impl CategoryBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a breakdown by accumulating every entry in order.
    pub fn try_from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, Decimal)>,
    {
        let mut breakdown = CategoryBreakdown::new();
        for (category, amount) in entries {
            breakdown.accumulate(&category, amount)?;
        }
        Ok(breakdown)
    }

    /// Add `amount` to the entry for `category`, creating it at zero first.
    /// The entry is left unchanged if the sum does not fit in a `Decimal`.
    pub fn accumulate(&mut self, category: &Category, amount: Decimal) -> Result<()> {
        let total = self.totals.entry(category.clone()).or_insert(Decimal::ZERO);
        *total = total.checked_add(amount).ok_or_else(|| {
            AngelError::invalid_input(format!("amount overflow in category {category}"))
        })?;
        Ok(())
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.totals.get(category).copied()
    }

    /// Sum of every entry.
    pub fn total(&self) -> Result<Decimal> {
        checked_sum(self.totals.values().copied())
    }

    /// Sum of every entry except `category`.
    pub fn total_excluding(&self, category: &str) -> Result<Decimal> {
        checked_sum(
            self.totals
                .iter()
                .filter(|(c, _)| c.as_str() != category)
                .map(|(_, amount)| *amount),
        )
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Category, Decimal> {
        self.totals.iter()
    }

    /// Entries sorted by category, for stable display.
    pub fn sorted(&self) -> Vec<(&Category, Decimal)> {
        let mut entries: Vec<_> = self.totals.iter().map(|(c, a)| (c, *a)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl<'a> IntoIterator for &'a CategoryBreakdown {
    type Item = (&'a Category, &'a Decimal);
    type IntoIter = hash_map::Iter<'a, Category, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.iter()
    }
}

fn checked_sum<I: Iterator<Item = Decimal>>(mut amounts: I) -> Result<Decimal> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount)
            .ok_or_else(|| AngelError::invalid_input("amount overflow"))
    })
}
