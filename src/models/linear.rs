//! Ordinary least squares with intercept.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::solve_least_squares;

/// Linear model `y = beta_0 + beta_1 x_1 + ...` (intercept first).
///
/// Also the parameter form produced by the Huber and RANSAC fitters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub betas: Vec<f64>,
}

impl LinearModel {
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut y = self.betas[0];
        for (b, v) in self.betas[1..].iter().zip(row.iter()) {
            y += b * v;
        }
        y
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// Build the design matrix with a leading intercept column.
pub fn design_matrix(x: &[Vec<f64>]) -> DMatrix<f64> {
    let n = x.len();
    let p = x[0].len();
    let mut out = DMatrix::<f64>::zeros(n, p + 1);
    for (i, row) in x.iter().enumerate() {
        out[(i, 0)] = 1.0;
        for (j, &v) in row.iter().enumerate() {
            out[(i, j + 1)] = v;
        }
    }
    out
}

/// Fit OLS via SVD least squares.
pub fn fit_ols(x: &[Vec<f64>], y: &[f64]) -> Result<LinearModel, AppError> {
    let xm = design_matrix(x);
    let yv = DVector::from_row_slice(y);

    let beta = solve_least_squares(&xm, &yv)
        .ok_or_else(|| AppError::new(4, "Least squares failed: design matrix is singular."))?;

    Ok(LinearModel {
        betas: beta.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ols_recovers_a_plane() {
        // y = 1 + 2a - 3b
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, (i % 5) as f64])
            .collect();
        let y: Vec<f64> = x.iter().map(|r| 1.0 + 2.0 * r[0] - 3.0 * r[1]).collect();

        let model = fit_ols(&x, &y).unwrap();
        assert!((model.betas[0] - 1.0).abs() < 1e-8);
        assert!((model.betas[1] - 2.0).abs() < 1e-8);
        assert!((model.betas[2] + 3.0).abs() < 1e-8);

        let pred = model.predict(&x);
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-8);
        }
    }
}
