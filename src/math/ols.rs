//! Least squares solvers.
//!
//! Several regressors in this project reduce to linear problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2
//! ```
//!
//! (plain OLS is the `w_i = 1` case; Huber IRLS and RANSAC refits reuse the
//! weighted form with changing weights).
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Polynomial speed features can make columns nearly collinear, so we try
//!   progressively looser tolerances before giving up.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a weighted least squares problem by scaling rows with `sqrt(w_i)`.
///
/// `weights` must have one entry per row of `x`; non-positive or non-finite
/// weights make the problem meaningless and return `None`.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: &[f64],
) -> Option<DVector<f64>> {
    if weights.len() != x.nrows() {
        return None;
    }
    if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return None;
    }

    let mut xw = x.clone();
    let mut yw = y.clone();
    for (i, &w) in weights.iter().enumerate() {
        let sw = w.sqrt();
        for j in 0..x.ncols() {
            xw[(i, j)] *= sw;
        }
        yw[i] *= sw;
    }

    solve_least_squares(&xw, &yw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weighted_solve_downweights_rows() {
        // Two contradictory observations at x=1; the heavy weight wins.
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 5.0, 2.0]);

        let beta = solve_weighted_least_squares(&x, &y, &[1000.0, 1e-6, 1000.0]).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn weighted_solve_rejects_bad_weights() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(solve_weighted_least_squares(&x, &y, &[1.0, 0.0]).is_none());
        assert!(solve_weighted_least_squares(&x, &y, &[1.0]).is_none());
    }
}
