//! Synthetic labelled transaction corpus.
//!
//! Eight categories with fixed description pools and amount ranges (INR).
//! Categories are drawn with weights favouring everyday spending, so Food
//! and Shopping dominate and Salary, Rent and EMI are rare.

use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::error::{AngelError, Result};
use crate::training::dataset::LabeledRow;

struct CategorySpec {
    name: &'static str,
    descriptions: &'static [&'static str],
    /// Inclusive amount range in whole rupees.
    min: i64,
    max: i64,
    weight: u32,
}

/// First date of the generated corpus. Evaluated at compile time.
pub const CORPUS_START: NaiveDate = match NaiveDate::from_ymd_opt(2023, 1, 1) {
    Some(date) => date,
    None => panic!("invalid corpus start date"),
};

const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        name: "Food",
        descriptions: &[
            "UPI/SWIGGY", "UPI/ZOMATO", "STARBUCKS", "MCDONALDS", "DOMINOS PIZZA", "UPI/KFC",
            "GROCERY STORE", "BLINKIT",
        ],
        min: 150,
        max: 2500,
        weight: 30,
    },
    CategorySpec {
        name: "Salary",
        descriptions: &["SALARY CREDIT - TCS", "INFOSYS SALARY", "ACCENTURE PAYROLL", "CREDIT - SALARY"],
        min: 80_000,
        max: 150_000,
        weight: 2,
    },
    CategorySpec {
        name: "Rent",
        descriptions: &["UPI/RENT TRANSFER", "TO LANDLORD", "HOUSE RENT", "NOBROKER RENT"],
        min: 15_000,
        max: 35_000,
        weight: 2,
    },
    CategorySpec {
        name: "EMI",
        descriptions: &[
            "ACH DEBIT - HDFC HOME LOAN", "SBI HOME LOAN EMI", "ICICI CAR LOAN", "BAJAJ FINSERV EMI",
        ],
        min: 25_000,
        max: 45_000,
        weight: 2,
    },
    CategorySpec {
        name: "Shopping",
        descriptions: &["AMAZON INDIA", "FLIPKART", "MYNTRA", "UPI/DECATHLON", "ZARA", "UNIQLO"],
        min: 500,
        max: 8000,
        weight: 20,
    },
    CategorySpec {
        name: "Entertainment",
        descriptions: &["NETFLIX SUB", "SPOTIFY PREMIUM", "PVR CINEMAS", "BOOKMYSHOW", "DISNEY+ HOTSTAR"],
        min: 199,
        max: 1500,
        weight: 15,
    },
    CategorySpec {
        name: "Investment",
        descriptions: &["ZERODHA BROKING", "GROWW SIP", "PPF TRANSFER", "NPS CONTRIBUTION"],
        min: 5000,
        max: 20_000,
        weight: 5,
    },
    CategorySpec {
        name: "Utilities",
        descriptions: &["BESCOM BILL", "JIO FIBER", "AIRTEL POSTPAID", "IGL GAS BILL"],
        min: 500,
        max: 3000,
        weight: 10,
    },
];

/// Dates fall within this many days after 2023-01-01.
const DATE_SPAN_DAYS: i64 = 365 * 2;

/// One generated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
}

impl From<&SyntheticTransaction> for LabeledRow {
    fn from(tx: &SyntheticTransaction) -> Self {
        LabeledRow::new(tx.description.clone(), tx.category.clone())
    }
}

/// Seeded generator; the same seed always yields the same corpus.
#[derive(Debug, Clone)]
pub struct CorpusGenerator {
    rng: StdRng,
    start: NaiveDate,
}

impl CorpusGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            start: CORPUS_START,
        }
    }

    /// Names of every category the generator can emit.
    pub fn categories() -> impl Iterator<Item = &'static str> {
        CATEGORIES.iter().map(|c| c.name)
    }

    fn pick_category(&mut self) -> &'static CategorySpec {
        let total: u32 = CATEGORIES.iter().map(|c| c.weight).sum();
        let mut roll = self.rng.random_range(0..total);
        for spec in CATEGORIES {
            if roll < spec.weight {
                return spec;
            }
            roll -= spec.weight;
        }
        &CATEGORIES[CATEGORIES.len() - 1]
    }

    pub fn next_transaction(&mut self) -> SyntheticTransaction {
        let spec = self.pick_category();
        let description = spec
            .descriptions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(spec.name);
        let cents = self.rng.random_range(spec.min * 100..=spec.max * 100);
        let offset = self.rng.random_range(0..=DATE_SPAN_DAYS);

        SyntheticTransaction {
            date: self.start + Duration::days(offset),
            description: description.to_string(),
            amount: Decimal::new(cents, 2),
            category: spec.name.to_string(),
        }
    }

    pub fn generate(&mut self, n: usize) -> Vec<SyntheticTransaction> {
        (0..n).map(|_| self.next_transaction()).collect()
    }
}

/// Write rows as CSV with a `Date,Description,Amount,Category` header.
pub fn write_csv<W: Write>(rows: &[SyntheticTransaction], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Date", "Description", "Amount", "Category"])?;
    for row in rows {
        wtr.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.description.clone(),
            row.amount.to_string(),
            row.category.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generate `n` rows and write them to `path`.
pub fn generate_to_file<P: AsRef<Path>>(n: usize, seed: u64, path: P) -> Result<Vec<SyntheticTransaction>> {
    if n == 0 {
        return Err(AngelError::invalid_input("row count must be at least 1"));
    }
    let path = path.as_ref();
    let rows = CorpusGenerator::new(seed).generate(n);
    let file = std::fs::File::create(path)?;
    write_csv(&rows, std::io::BufWriter::new(file))?;
    log::info!("generated {n} transactions at {}", path.display());
    Ok(rows)
}
