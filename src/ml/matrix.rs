//! Dense column-major feature matrix used while growing trees.

use crate::ml::sparse::SparseVector;

/// Training rows laid out column by column.
///
/// Split search scans one feature over many rows, so each column is
/// contiguous. Only lives for the duration of a fit.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn from_sparse(rows: &[SparseVector], n_cols: usize) -> Self {
        let n_rows = rows.len();
        let mut data = vec![0.0; n_rows * n_cols];
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter() {
                if c < n_cols {
                    data[c * n_rows + r] = value;
                }
            }
        }
        Self {
            n_rows,
            n_cols,
            data,
        }
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.data[col * self.n_rows..(col + 1) * self.n_rows]
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }
}
