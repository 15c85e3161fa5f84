//! Outlier-robust linear fitters: Huber IRLS and RANSAC.
//!
//! Curtailment events and icing produce power readings far off the turbine
//! curve; both fitters keep a handful of such rows from dominating the fit.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::AppError;
use crate::math::{mad, robust_scale, solve_weighted_least_squares};
use crate::models::linear::{design_matrix, fit_ols, LinearModel};

/// Minimum weight factor so no observation is dropped entirely during IRLS.
const MIN_WEIGHT_FACTOR: f64 = 1e-3;

/// Huber M-estimator via iterative reweighted least squares.
///
/// Each iteration: compute residuals, estimate a robust scale from their MAD,
/// downweight residuals beyond `delta * scale`, and re-solve. This is
/// deterministic and converges in a handful of iterations in practice.
pub fn fit_huber(
    x: &[Vec<f64>],
    y: &[f64],
    delta: f64,
    iters: usize,
) -> Result<LinearModel, AppError> {
    if !(delta.is_finite() && delta > 0.0) {
        return Err(AppError::new(2, "Huber delta must be finite and > 0."));
    }

    let mut model = fit_ols(x, y)?;

    let xm = design_matrix(x);
    let yv = DVector::from_row_slice(y);

    for _ in 0..iters {
        let residuals: Vec<f64> = x
            .iter()
            .zip(y.iter())
            .map(|(row, &t)| t - model.predict_one(row))
            .collect();

        let scale = robust_scale(&residuals);
        let cutoff = delta * scale;

        let weights: Vec<f64> = residuals
            .iter()
            .map(|r| {
                let ar = r.abs();
                let factor = if ar <= cutoff || !ar.is_finite() {
                    1.0
                } else {
                    cutoff / ar
                };
                factor.max(MIN_WEIGHT_FACTOR)
            })
            .collect();

        let beta = solve_weighted_least_squares(&xm, &yv, &weights)
            .ok_or_else(|| AppError::new(4, "Huber reweighted solve failed."))?;
        model = LinearModel {
            betas: beta.iter().copied().collect(),
        };
    }

    Ok(model)
}

/// Random-sample consensus over OLS base fits.
///
/// The inlier threshold is the MAD of the targets (the usual default); the
/// final model is an OLS refit on the largest inlier set found across
/// `max_trials` seeded subsamples, so results are reproducible for a fixed
/// seed.
pub fn fit_ransac(
    x: &[Vec<f64>],
    y: &[f64],
    min_fraction: f64,
    max_trials: usize,
    seed: u64,
) -> Result<LinearModel, AppError> {
    if !(min_fraction.is_finite() && min_fraction > 0.0 && min_fraction <= 1.0) {
        return Err(AppError::new(2, "RANSAC min fraction must be in (0, 1]."));
    }
    if max_trials == 0 {
        return Err(AppError::new(2, "RANSAC needs at least one trial."));
    }

    let n = x.len();
    let p = x[0].len();
    let min_samples = ((min_fraction * n as f64).ceil() as usize).max(p + 1);
    if min_samples >= n {
        // Too few rows for consensus; the plain fit is the best we can do.
        return fit_ols(x, y);
    }

    let threshold = mad(y).unwrap_or(0.0);
    if threshold <= 0.0 {
        // Degenerate target spread, nothing to vote on.
        return fit_ols(x, y);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<(Vec<usize>, f64)> = None;

    for _ in 0..max_trials {
        let subset = rand::seq::index::sample(&mut rng, n, min_samples).into_vec();
        let xs: Vec<Vec<f64>> = subset.iter().map(|&i| x[i].clone()).collect();
        let ys: Vec<f64> = subset.iter().map(|&i| y[i]).collect();

        // Degenerate subsets (e.g. collinear rows) just skip the trial.
        let Ok(candidate) = fit_ols(&xs, &ys) else {
            continue;
        };

        let mut inliers = Vec::new();
        let mut sse = 0.0;
        for (i, row) in x.iter().enumerate() {
            let r = y[i] - candidate.predict_one(row);
            if r.abs() <= threshold {
                inliers.push(i);
                sse += r * r;
            }
        }

        let better = match &best {
            None => true,
            Some((prev, prev_sse)) => {
                inliers.len() > prev.len() || (inliers.len() == prev.len() && sse < *prev_sse)
            }
        };
        if better {
            best = Some((inliers, sse));
        }
    }

    match best {
        Some((inliers, _)) if inliers.len() > p + 1 => {
            let xi: Vec<Vec<f64>> = inliers.iter().map(|&i| x[i].clone()).collect();
            let yi: Vec<f64> = inliers.iter().map(|&i| y[i]).collect();
            fit_ols(&xi, &yi)
        }
        _ => fit_ols(x, y),
    }
}
