//! Held-out evaluation metrics.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};

/// Precision, recall and F1 for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true rows with this label.
    pub support: usize,
}

/// Per-label report plus accuracy and averages.
///
/// A label that is never predicted gets precision 0; one that never occurs
/// gets recall 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    pub n_samples: usize,
}

impl ClassificationReport {
    pub fn evaluate<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(AngelError::model(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(AngelError::model("cannot evaluate on zero rows"));
        }

        let labels: BTreeSet<&str> = y_true
            .iter()
            .chain(y_pred.iter())
            .map(|l| l.as_ref())
            .collect();

        let n = y_true.len();
        let correct = y_true
            .iter()
            .zip(y_pred)
            .filter(|(t, p)| t.as_ref() == p.as_ref())
            .count();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let mut tp = 0usize;
                let mut predicted = 0usize;
                let mut support = 0usize;
                for (t, p) in y_true.iter().zip(y_pred) {
                    let is_true = t.as_ref() == label;
                    let is_pred = p.as_ref() == label;
                    support += is_true as usize;
                    predicted += is_pred as usize;
                    tp += (is_true && is_pred) as usize;
                }
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support,
                }
            })
            .collect();

        let k = classes.len() as f64;
        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / k,
            support: n,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / n as f64
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: n,
        };

        Ok(Self {
            accuracy: correct as f64 / n as f64,
            classes,
            macro_avg,
            weighted_avg,
            n_samples: n,
        })
    }

    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.n_samples
        )?;
        for c in [&self.macro_avg, &self.weighted_avg] {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = ["Food", "Rent", "Food"];
        let report = ClassificationReport::evaluate(&y, &y).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_avg.f1, 1.0);
        assert_eq!(report.class("Food").unwrap().support, 2);
    }

    #[test]
    fn test_precision_and_recall() {
        let y_true = ["Food", "Food", "Rent", "Rent"];
        let y_pred = ["Food", "Rent", "Rent", "Rent"];
        let report = ClassificationReport::evaluate(&y_true, &y_pred).unwrap();

        assert_eq!(report.accuracy, 0.75);
        let food = report.class("Food").unwrap();
        assert_eq!(food.precision, 1.0);
        assert_eq!(food.recall, 0.5);
        let rent = report.class("Rent").unwrap();
        assert!((rent.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(rent.recall, 1.0);
        assert_eq!(report.weighted_avg.recall, 0.75);
    }

    #[test]
    fn test_never_predicted_label_has_zero_precision() {
        let report = ClassificationReport::evaluate(&["EMI"], &["Rent"]).unwrap();
        assert_eq!(report.class("EMI").unwrap().precision, 0.0);
        assert_eq!(report.class("Rent").unwrap().recall, 0.0);
        assert_eq!(report.class("Rent").unwrap().f1, 0.0);
    }

    #[test]
    fn test_display_lists_every_label() {
        let report = ClassificationReport::evaluate(&["Food", "Salary"], &["Food", "Salary"]).unwrap();
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("Salary"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ClassificationReport::evaluate(&["Food"], &[]).is_err());
    }
}
