//! The out-of-fold prediction matrix `Z`.
use serde::{Serialize, Deserialize};

use crate::hypothesis::Combination;


/// A dense `n × k` matrix stored column by column.
/// Column `j` holds the out-of-fold predictions of candidate `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMatrix {
    n_rows: usize,
    n_cols: usize,
    columns: Vec<Vec<f64>>,
}


impl PredictionMatrix {
    /// Allocates an `n_rows × n_cols` matrix filled with `NaN`.
    /// Every cell is expected to be written exactly once.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        let columns = vec![vec![f64::NAN; n_rows]; n_cols];
        Self { n_rows, n_cols, columns }
    }


    /// Builds a matrix from its columns.
    ///
    /// # Panics
    /// Panics if the columns differ in length.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Self {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        assert!(
            columns.iter().all(|c| c.len() == n_rows),
            "columns of a prediction matrix must share one length"
        );
        let n_cols = columns.len();
        Self { n_rows, n_cols, columns }
    }


    /// Returns `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }


    /// Returns the `j`-th column.
    #[inline(always)]
    pub fn column(&self, j: usize) -> &[f64] {
        &self.columns[j][..]
    }


    /// Returns the cell `(i, j)`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.columns[j][i]
    }


    /// Returns the `i`-th row.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[i]).collect()
    }


    /// Writes `values[p]` into the cell `(rows[p], j)`.
    pub(crate) fn scatter(&mut self, j: usize, rows: &[usize], values: &[f64]) {
        debug_assert_eq!(rows.len(), values.len());
        let column = &mut self.columns[j];
        rows.iter()
            .zip(values)
            .for_each(|(&i, &v)| column[i] = v);
    }


    /// Returns the columns in `indices`, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Vec<&[f64]> {
        indices.iter().map(|&j| self.column(j)).collect()
    }


    /// Combines every row with `weights` under `combination`.
    /// Zero-weight columns are skipped, so they may hold anything.
    pub fn combine(&self, weights: &[f64], combination: Combination)
        -> Vec<f64>
    {
        let (active, w): (Vec<usize>, Vec<f64>) = weights.iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .unzip();
        (0..self.n_rows)
            .map(|i| {
                let row = active.iter()
                    .map(|&j| self.columns[j][i])
                    .collect::<Vec<_>>();
                combination.combine(&w, &row)
            })
            .collect()
    }
}
