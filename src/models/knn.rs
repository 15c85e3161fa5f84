//! k-nearest-neighbour regression (brute force).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// KNN keeps its training window and averages the `k` nearest targets.
///
/// Brute force is fine at this scale: a 90-day half-hourly window is a few
/// thousand rows with a handful of features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    pub k: usize,
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<f64>,
}

pub fn fit_knn(x: &[Vec<f64>], y: &[f64], k: usize) -> Result<KnnModel, AppError> {
    if k == 0 {
        return Err(AppError::new(2, "KNN needs k >= 1."));
    }
    if x.len() < k {
        return Err(AppError::new(
            3,
            format!("KNN needs at least k={k} training rows, got {}.", x.len()),
        ));
    }
    Ok(KnnModel {
        k,
        x_train: x.to_vec(),
        y_train: y.to_vec(),
    })
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

impl KnnModel {
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut dist: Vec<(f64, f64)> = self
            .x_train
            .iter()
            .zip(self.y_train.iter())
            .map(|(xr, &t)| (squared_distance(row, xr), t))
            .collect();
        dist.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.k.min(dist.len());
        dist[..k].iter().map(|(_, t)| t).sum::<f64>() / k as f64
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.predict_one(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knn_averages_the_nearest_targets() {
        let x = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
        let y = vec![0.0, 2.0, 100.0, 102.0];
        let model = fit_knn(&x, &y, 2).unwrap();

        // Query near the left cluster.
        assert!((model.predict_one(&[0.4]) - 1.0).abs() < 1e-12);
        // Query near the right cluster.
        assert!((model.predict_one(&[10.6]) - 101.0).abs() < 1e-12);
    }

    #[test]
    fn knn_rejects_bad_k() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0.0, 1.0];
        assert!(fit_knn(&x, &y, 0).is_err());
        assert!(fit_knn(&x, &y, 3).is_err());
    }
}
