//! Gaussian-process regression with an RBF kernel.
//!
//! Mean prediction only: with the kernel matrix `K` over the (subsampled)
//! training inputs and noise `sigma^2`, we solve
//!
//! ```text
//! (K + sigma^2 I) alpha = y - mean(y)
//! ```
//!
//! once via Cholesky and predict `mean(y) + k_*^T alpha`.

use nalgebra::{Cholesky, DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::mean;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpModel {
    pub x_train: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub length_scale: f64,
    pub y_mean: f64,
}

fn rbf(a: &[f64], b: &[f64], length_scale: f64) -> f64 {
    let sq: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    (-sq / (2.0 * length_scale * length_scale)).exp()
}

/// Deterministic stride subsample keeping the Gram solve tractable.
fn stride_subsample(x: &[Vec<f64>], y: &[f64], max_points: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let n = x.len();
    if max_points == 0 || n <= max_points {
        return (x.to_vec(), y.to_vec());
    }
    let stride = n.div_ceil(max_points);
    let xs: Vec<Vec<f64>> = x.iter().step_by(stride).cloned().collect();
    let ys: Vec<f64> = y.iter().step_by(stride).copied().collect();
    (xs, ys)
}

pub fn fit_gp(
    x: &[Vec<f64>],
    y: &[f64],
    length_scale: f64,
    noise: f64,
    max_points: usize,
) -> Result<GpModel, AppError> {
    if !(length_scale.is_finite() && length_scale > 0.0) {
        return Err(AppError::new(2, "GP length scale must be finite and > 0."));
    }
    if !(noise.is_finite() && noise > 0.0) {
        return Err(AppError::new(2, "GP noise must be finite and > 0."));
    }

    let (xs, ys) = stride_subsample(x, y, max_points);
    let n = xs.len();

    let y_mean = mean(&ys).unwrap_or(0.0);
    let centered = DVector::from_iterator(n, ys.iter().map(|v| v - y_mean));

    let mut k = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let v = rbf(&xs[i], &xs[j], length_scale);
            k[(i, j)] = v;
            k[(j, i)] = v;
        }
    }

    // Escalate the jitter a couple of times before giving up; near-duplicate
    // rows make the Gram matrix numerically semi-definite.
    let mut jitter = noise;
    for _ in 0..3 {
        let mut kn = k.clone();
        for i in 0..n {
            kn[(i, i)] += jitter;
        }
        if let Some(chol) = Cholesky::new(kn) {
            let alpha = chol.solve(&centered);
            return Ok(GpModel {
                x_train: xs,
                alpha: alpha.iter().copied().collect(),
                length_scale,
                y_mean,
            });
        }
        jitter *= 10.0;
    }

    Err(AppError::new(
        4,
        "GP kernel matrix is not positive definite even after jitter escalation.",
    ))
}

impl GpModel {
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut acc = self.y_mean;
        for (xr, a) in self.x_train.iter().zip(self.alpha.iter()) {
            acc += a * rbf(row, xr, self.length_scale);
        }
        acc
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}
