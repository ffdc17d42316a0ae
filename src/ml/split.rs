//! Stratified train/test splitting.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{AngelError, Result};

/// Row indices of the two partitions, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so every label keeps its share in both partitions.
///
/// For each label (in lexicographic order) its rows are shuffled with the
/// seeded RNG and `round(count * test_fraction)` of them, clamped to
/// `1..=count - 1`, go to the test partition. A label with fewer than two
/// rows cannot appear on both sides and fails the split.
pub fn stratified_split<S: AsRef<str>>(
    labels: &[S],
    test_fraction: f64,
    seed: u64,
) -> Result<StratifiedSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AngelError::invalid_config(format!(
            "test fraction must be between 0 and 1, got {test_fraction}"
        )));
    }
    if labels.is_empty() {
        return Err(AngelError::insufficient_data("dataset is empty"));
    }

    let mut by_label: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        by_label.entry(label.as_ref()).or_default().push(i);
    }

    if let Some((label, rows)) = by_label.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(AngelError::insufficient_data(format!(
            "category '{label}' has {} row(s); at least 2 are needed to stratify",
            rows.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (_, mut rows) in by_label {
        rows.shuffle(&mut rng);
        let count = rows.len();
        let n_test = ((count as f64 * test_fraction).round() as usize).clamp(1, count - 1);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();

    Ok(StratifiedSplit { train, test })
}
