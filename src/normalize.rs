//! Row-independent transforms that prepare matrices for color mapping.
//!
//! All functions are pure and keep the input shape. A constant row (zero
//! extent) maps to `0.5` under `min_max` and `sqrt`; softmax of a constant
//! row is uniform.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_types::Matrix;
use crate::scales::ChartScale;

/// Shift applied before the square-root scale so zero rows stay finite.
pub const SQRT_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    #[default]
    MinMax,
    Sqrt,
    Softmax,
    /// Values are already in [0, 1].
    None,
}

impl Normalization {
    pub fn apply(self, matrix: &Matrix) -> Matrix {
        match self {
            Self::MinMax => min_max(matrix),
            Self::Sqrt => sqrt(matrix),
            Self::Softmax => softmax_rows(matrix),
            Self::None => matrix.clone(),
        }
    }
}

fn extent(row: &[f64]) -> (f64, f64) {
    row.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

fn map_rows(matrix: &Matrix, f: impl Fn(&mut [f64]) + Sync + Send) -> Matrix {
    let mut out = matrix.clone();
    if out.is_empty() {
        return out;
    }
    let cols = out.cols();
    out.values_mut().par_chunks_mut(cols).for_each(|row| f(row));
    out
}

/// Per row: `(v - min) / (max - min)`.
pub fn min_max(matrix: &Matrix) -> Matrix {
    map_rows(matrix, min_max_row)
}

pub fn min_max_row(row: &mut [f64]) {
    let scale = ChartScale::new_linear(extent(row), (0.0, 1.0));
    for v in row.iter_mut() {
        *v = scale.map_f64(*v);
    }
}

/// Per row: shift by [`SQRT_EPSILON`], then position under a power-0.5 scale
/// between the shifted min and max.
pub fn sqrt(matrix: &Matrix) -> Matrix {
    map_rows(matrix, sqrt_row)
}

pub fn sqrt_row(row: &mut [f64]) {
    for v in row.iter_mut() {
        *v += SQRT_EPSILON;
    }
    let scale = ChartScale::new_sqrt(extent(row), (0.0, 1.0));
    for v in row.iter_mut() {
        *v = scale.map_f64(*v);
    }
}

/// Numerically stable softmax of a single row.
pub fn softmax(row: &[f64]) -> Vec<f64> {
    let mut out = row.to_vec();
    softmax_in_place(&mut out);
    out
}

fn softmax_in_place(row: &mut [f64]) {
    if row.is_empty() {
        return;
    }
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in row.iter_mut() {
        *v /= sum;
    }
}

/// Softmax applied to every row (prediction logits -> probabilities).
pub fn softmax_rows(matrix: &Matrix) -> Matrix {
    map_rows(matrix, softmax_in_place)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_rows_are_constant() {
        let m = Matrix::from_rows(vec![vec![3.0], vec![-2.0]]).unwrap();
        for normalized in [min_max(&m), sqrt(&m)] {
            assert!(normalized.values().iter().all(|v| (v - 0.5).abs() < 1e-9));
        }
        assert_eq!(softmax_rows(&m).values(), &[1.0, 1.0]);
    }

    #[test]
    fn sqrt_handles_zero_and_negative_rows() {
        let m = Matrix::from_rows(vec![vec![0.0, 0.0, 0.0], vec![-1.0, 0.0, 3.0]]).unwrap();
        let n = sqrt(&m);
        assert!(n.values().iter().all(|v| v.is_finite()));
        let row = n.row(1).unwrap();
        assert!((row[0] - 0.0).abs() < 1e-9);
        assert!((row[2] - 1.0).abs() < 1e-9);
        assert!(row[1] > 0.0 && row[1] < 1.0);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let p = softmax(&[1000.0, 1001.0, 1002.0]);
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(p[0] < p[1] && p[1] < p[2]);
    }
}
