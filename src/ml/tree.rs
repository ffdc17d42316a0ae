//! CART decision tree classifier.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};
use crate::ml::matrix::FeatureMatrix;
use crate::ml::sparse::SparseVector;

/// How many features to examine at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `sqrt(n_features)`, the usual choice for forests.
    Sqrt,
    /// `log2(n_features)`.
    Log2,
    /// Every feature.
    All,
    /// A fixed number, capped at `n_features`.
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count in `1..=n_features`.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let k = match self {
            MaxFeatures::Sqrt => (n as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n as f64).log2() as usize,
            MaxFeatures::All => n,
            MaxFeatures::Count(k) => *k,
        };
        k.clamp(1, n)
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum depth. `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Features examined per split.
    pub max_features: MaxFeatures,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
        }
    }
}

impl TreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(AngelError::invalid_config("max_depth must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(AngelError::invalid_config("min_samples_split must be at least 2"));
        }
        if self.min_samples_leaf < 1 {
            return Err(AngelError::invalid_config("min_samples_leaf must be at least 1"));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(AngelError::invalid_config("max_features must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    /// `x[feature] <= threshold` goes left.
    Split {
        feature: u32,
        threshold: f64,
        left: u32,
        right: u32,
    },
    Leaf {
        class: u32,
    },
}

/// A classification tree grown on Gini impurity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    /// Flat node arena; index 0 is the root.
    nodes: Vec<Node>,
    n_classes: usize,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTreeClassifier {
    /// Grow a tree on the rows listed in `samples` (repeats allowed, as in a
    /// bootstrap sample). `labels[i]` is the class index of matrix row `i`.
    pub fn fit(
        matrix: &FeatureMatrix,
        labels: &[u32],
        n_classes: usize,
        samples: &[usize],
        config: &TreeConfig,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if labels.len() != matrix.n_rows() {
            return Err(AngelError::model(format!(
                "feature matrix has {} rows but {} labels",
                matrix.n_rows(),
                labels.len()
            )));
        }
        if samples.is_empty() || n_classes == 0 {
            return Err(AngelError::model("cannot grow a tree without samples"));
        }

        let max_features = config.max_features.resolve(matrix.n_cols());
        let mut nodes = vec![Node::Leaf { class: 0 }];
        let mut stack = vec![Pending {
            node: 0,
            samples: samples.to_vec(),
            depth: 0,
        }];

        while let Some(pending) = stack.pop() {
            let counts = class_counts(labels, &pending.samples, n_classes);
            let majority = majority_class(&counts);

            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let depth_exhausted = config.max_depth.is_some_and(|d| pending.depth >= d);
            if pure || depth_exhausted || pending.samples.len() < config.min_samples_split {
                nodes[pending.node] = Node::Leaf { class: majority };
                continue;
            }

            let split = find_best_split(
                matrix,
                labels,
                &pending.samples,
                &counts,
                config.min_samples_leaf,
                max_features,
                rng,
            );

            let Some(split) = split else {
                nodes[pending.node] = Node::Leaf { class: majority };
                continue;
            };

            let column = matrix.column(split.feature);
            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = pending
                .samples
                .iter()
                .partition(|&&i| column[i] <= split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { class: majority });
            let right = nodes.len();
            nodes.push(Node::Leaf { class: majority });
            nodes[pending.node] = Node::Split {
                feature: split.feature as u32,
                threshold: split.threshold,
                left: left as u32,
                right: right as u32,
            };

            log::trace!(
                "split node {} on feature {} at {:.6} (impurity {:.4}, {} | {})",
                pending.node,
                split.feature,
                split.threshold,
                split.impurity,
                left_samples.len(),
                right_samples.len()
            );

            stack.push(Pending {
                node: right,
                samples: right_samples,
                depth: pending.depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: left_samples,
                depth: pending.depth + 1,
            });
        }

        Ok(Self { nodes, n_classes })
    }

    /// Predict the class index for a feature vector.
    pub fn predict(&self, features: &SparseVector) -> u32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features.get(*feature as usize) <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((*left as usize, depth + 1));
                    stack.push((*right as usize, depth + 1));
                }
            }
        }
        deepest
    }

    /// Check that every child index points inside the arena and every leaf
    /// class is in range. Used after deserializing an artifact.
    pub(crate) fn check_consistency(&self, n_classes: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AngelError::serialization("tree has no nodes"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { class } if (*class as usize) >= n_classes => {
                    return Err(AngelError::serialization(format!(
                        "leaf {i} predicts class {class} of {n_classes}"
                    )));
                }
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    let in_arena = |c: u32| (c as usize) > i && (c as usize) < self.nodes.len();
                    if !in_arena(*left) || !in_arena(*right) || (*feature as usize) >= n_features {
                        return Err(AngelError::serialization(format!(
                            "split node {i} is out of range"
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn class_counts(labels: &[u32], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in samples {
        counts[labels[i] as usize] += 1;
    }
    counts
}

/// Index of the largest count; ties go to the lowest index.
pub(crate) fn majority_class(counts: &[usize]) -> u32 {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best as u32
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Draw features in random order and keep the lowest weighted Gini split.
///
/// Constant features do not count towards `max_features`, so sparse columns
/// that are all zero in this node never starve the search.
fn find_best_split(
    matrix: &FeatureMatrix,
    labels: &[u32],
    samples: &[usize],
    parent_counts: &[usize],
    min_samples_leaf: usize,
    max_features: usize,
    rng: &mut StdRng,
) -> Option<BestSplit> {
    let n = samples.len();
    let mut features: Vec<usize> = (0..matrix.n_cols()).collect();
    features.shuffle(rng);

    let mut best: Option<BestSplit> = None;
    let mut examined = 0;
    let mut values: Vec<(f64, u32)> = Vec::with_capacity(n);

    for feature in features {
        if examined >= max_features {
            break;
        }

        let column = matrix.column(feature);
        let first = column[samples[0]];
        if samples.iter().all(|&i| column[i] == first) {
            continue;
        }
        examined += 1;

        values.clear();
        values.extend(samples.iter().map(|&i| (column[i], labels[i])));
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0usize; parent_counts.len()];
        let mut right_counts = parent_counts.to_vec();

        for i in 0..n - 1 {
            let class = values[i].1 as usize;
            left_counts[class] += 1;
            right_counts[class] -= 1;

            if values[i].0 == values[i + 1].0 {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / n as f64;

            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                let (lo, hi) = (values[i].0, values[i + 1].0);
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn toy() -> (FeatureMatrix, Vec<u32>) {
        // Feature 0 separates class 0 from 1; feature 1 is noise.
        let rows = vec![
            SparseVector::from_pairs(2, vec![(0, 0.1), (1, 0.5)]),
            SparseVector::from_pairs(2, vec![(0, 0.2)]),
            SparseVector::from_pairs(2, vec![(0, 0.9), (1, 0.5)]),
            SparseVector::from_pairs(2, vec![(0, 0.8)]),
        ];
        (FeatureMatrix::from_sparse(&rows, 2), vec![0, 0, 1, 1])
    }

    #[test]
    fn test_fits_separable_data() {
        let (matrix, labels) = toy();
        let config = TreeConfig {
            max_features: MaxFeatures::All,
            ..TreeConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let tree =
            DecisionTreeClassifier::fit(&matrix, &labels, 2, &[0, 1, 2, 3], &config, &mut rng)
                .unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict(&SparseVector::from_pairs(2, vec![(0, 0.15)])), 0);
        assert_eq!(tree.predict(&SparseVector::from_pairs(2, vec![(0, 0.95)])), 1);
        assert!(tree.check_consistency(2, 2).is_ok());
    }

    #[test]
    fn test_pure_node_is_single_leaf() {
        let (matrix, labels) = toy();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTreeClassifier::fit(
            &matrix,
            &labels,
            2,
            &[0, 1],
            &TreeConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&SparseVector::zeros(2)), 0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let rows: Vec<SparseVector> = (0..8)
            .map(|i| SparseVector::from_pairs(1, vec![(0, i as f64)]))
            .collect();
        let matrix = FeatureMatrix::from_sparse(&rows, 1);
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1];
        let config = TreeConfig {
            max_depth: Some(2),
            ..TreeConfig::default()
        };
        let samples: Vec<usize> = (0..8).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let tree =
            DecisionTreeClassifier::fit(&matrix, &labels, 2, &samples, &config, &mut rng).unwrap();
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_constant_features_give_majority_leaf() {
        let rows = vec![SparseVector::zeros(3); 3];
        let matrix = FeatureMatrix::from_sparse(&rows, 3);
        let labels = vec![1, 0, 1];
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTreeClassifier::fit(
            &matrix,
            &labels,
            2,
            &[0, 1, 2],
            &TreeConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&SparseVector::zeros(3)), 1);
    }

    #[test]
    fn test_majority_ties_pick_lowest_index() {
        assert_eq!(majority_class(&[2, 3, 3]), 1);
        assert_eq!(majority_class(&[0, 0]), 0);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(1000), 31);
        assert_eq!(MaxFeatures::Log2.resolve(1024), 10);
        assert_eq!(MaxFeatures::All.resolve(12), 12);
        assert_eq!(MaxFeatures::Count(50).resolve(12), 12);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let (matrix, _) = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let result =
            DecisionTreeClassifier::fit(&matrix, &[0, 1], 2, &[0], &TreeConfig::default(), &mut rng);
        assert!(result.is_err());
    }
}
