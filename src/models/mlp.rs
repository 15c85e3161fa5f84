//! Small feed-forward network: two tanh hidden layers, linear output,
//! full-batch gradient descent.
//!
//! Inputs and targets are standardized internally (statistics stored on the
//! model), which keeps one learning rate workable across pipelines whose
//! feature scales differ wildly (raw hours vs sin/cos components).

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::{mean, std_dev};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpModel {
    /// Row-major `d x h`.
    pub w1: Vec<Vec<f64>>,
    pub b1: Vec<f64>,
    /// Row-major `h x h`.
    pub w2: Vec<Vec<f64>>,
    pub b2: Vec<f64>,
    pub w3: Vec<f64>,
    pub b3: f64,

    pub x_mean: Vec<f64>,
    pub x_std: Vec<f64>,
    pub y_mean: f64,
    pub y_std: f64,
}

fn column_stats(x: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let p = x[0].len();
    let mut means = Vec::with_capacity(p);
    let mut stds = Vec::with_capacity(p);
    for j in 0..p {
        let col: Vec<f64> = x.iter().map(|r| r[j]).collect();
        means.push(mean(&col).unwrap_or(0.0));
        stds.push(std_dev(&col).unwrap_or(0.0).max(1e-9));
    }
    (means, stds)
}

fn xavier_init(rng: &mut StdRng, rows: usize, cols: usize) -> DMatrix<f64> {
    let s = (6.0 / (rows + cols) as f64).sqrt();
    DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-s..s))
}

fn add_row_bias(m: &mut DMatrix<f64>, bias: &DVector<f64>) {
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            m[(i, j)] += bias[j];
        }
    }
}

pub fn fit_mlp(
    x: &[Vec<f64>],
    y: &[f64],
    hidden: usize,
    epochs: usize,
    learning_rate: f64,
    seed: u64,
) -> Result<MlpModel, AppError> {
    if hidden == 0 {
        return Err(AppError::new(2, "MLP hidden width must be >= 1."));
    }
    if epochs == 0 {
        return Err(AppError::new(2, "MLP needs at least one epoch."));
    }
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(AppError::new(2, "MLP learning rate must be finite and > 0."));
    }
    if x.len() < 2 {
        return Err(AppError::new(3, "MLP needs at least 2 training rows."));
    }

    let n = x.len();
    let d = x[0].len();
    let h = hidden;

    let (x_mean, x_std) = column_stats(x);
    let y_mean = mean(y).unwrap_or(0.0);
    let y_std = std_dev(y).unwrap_or(0.0).max(1e-9);

    let xs = DMatrix::from_fn(n, d, |i, j| (x[i][j] - x_mean[j]) / x_std[j]);
    let ys = DVector::from_iterator(n, y.iter().map(|v| (v - y_mean) / y_std));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut w1 = xavier_init(&mut rng, d, h);
    let mut b1 = DVector::<f64>::zeros(h);
    let mut w2 = xavier_init(&mut rng, h, h);
    let mut b2 = DVector::<f64>::zeros(h);
    let mut w3 = xavier_init(&mut rng, h, 1).column(0).into_owned();
    let mut b3 = 0.0;

    let c = 2.0 / n as f64;

    for _ in 0..epochs {
        // Forward pass.
        let mut z1 = &xs * &w1;
        add_row_bias(&mut z1, &b1);
        let a1 = z1.map(|v| v.tanh());

        let mut z2 = &a1 * &w2;
        add_row_bias(&mut z2, &b2);
        let a2 = z2.map(|v| v.tanh());

        let yhat = &a2 * &w3 + DVector::from_element(n, b3);
        let err = &yhat - &ys;

        let loss = err.dot(&err) / n as f64;
        if !loss.is_finite() {
            return Err(AppError::new(
                4,
                "MLP training diverged (non-finite loss); lower the learning rate.",
            ));
        }

        // Backward pass (MSE loss derivative folded into `d_out`).
        let d_out = err.scale(c);

        let g_w3 = a2.transpose() * &d_out;
        let g_b3: f64 = d_out.iter().sum();

        let d_a2 = &d_out * w3.transpose();
        let d_z2 = d_a2.component_mul(&a2.map(|v| 1.0 - v * v));
        let g_w2 = a1.transpose() * &d_z2;
        let g_b2 = d_z2.row_sum().transpose();

        let d_a1 = &d_z2 * w2.transpose();
        let d_z1 = d_a1.component_mul(&a1.map(|v| 1.0 - v * v));
        let g_w1 = xs.transpose() * &d_z1;
        let g_b1 = d_z1.row_sum().transpose();

        w1 -= g_w1.scale(learning_rate);
        b1 -= g_b1.scale(learning_rate);
        w2 -= g_w2.scale(learning_rate);
        b2 -= g_b2.scale(learning_rate);
        w3 -= g_w3.scale(learning_rate);
        b3 -= learning_rate * g_b3;
    }

    Ok(MlpModel {
        w1: (0..d)
            .map(|i| (0..h).map(|j| w1[(i, j)]).collect())
            .collect(),
        b1: b1.iter().copied().collect(),
        w2: (0..h)
            .map(|i| (0..h).map(|j| w2[(i, j)]).collect())
            .collect(),
        b2: b2.iter().copied().collect(),
        w3: w3.iter().copied().collect(),
        b3,
        x_mean,
        x_std,
        y_mean,
        y_std,
    })
}

impl MlpModel {
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let h = self.b1.len();

        let xs: Vec<f64> = row
            .iter()
            .zip(self.x_mean.iter().zip(self.x_std.iter()))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect();

        let mut a1 = vec![0.0; h];
        for (j, a) in a1.iter_mut().enumerate() {
            let mut z = self.b1[j];
            for (i, &v) in xs.iter().enumerate() {
                z += v * self.w1[i][j];
            }
            *a = z.tanh();
        }

        let mut a2 = vec![0.0; h];
        for (k, a) in a2.iter_mut().enumerate() {
            let mut z = self.b2[k];
            for (j, &v) in a1.iter().enumerate() {
                z += v * self.w2[j][k];
            }
            *a = z.tanh();
        }

        let mut z = self.b3;
        for (k, &v) in a2.iter().enumerate() {
            z += v * self.w3[k];
        }

        z * self.y_std + self.y_mean
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}
