//! Regression models swept by the grid.
//!
//! Models are implemented as small structs of plain parameter vectors so the
//! winning model serializes straight into the artifact JSON. Fitting and
//! prediction dispatch over `ModelKind` with a match; no trait objects.

pub mod gp;
pub mod knn;
pub mod linear;
pub mod mlp;
pub mod robust;

pub use gp::*;
pub use knn::*;
pub use linear::*;
pub use mlp::*;
pub use robust::*;

use serde::{Deserialize, Serialize};

use crate::domain::{ModelKind, SearchConfig};
use crate::error::AppError;

/// Model hyperparameters resolved from the run configuration.
#[derive(Debug, Clone)]
pub struct ModelHyperParams {
    pub knn_k: usize,
    pub huber_delta: f64,
    pub huber_iters: usize,
    pub ransac_trials: usize,
    pub ransac_min_fraction: f64,
    pub gp_length_scale: f64,
    pub gp_noise: f64,
    pub gp_max_points: usize,
    pub mlp_hidden: usize,
    pub mlp_epochs: usize,
    pub mlp_learning_rate: f64,
}

impl ModelHyperParams {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            knn_k: config.knn_k,
            huber_delta: config.huber_delta,
            huber_iters: config.huber_iters,
            ransac_trials: config.ransac_trials,
            ransac_min_fraction: config.ransac_min_fraction,
            gp_length_scale: config.gp_length_scale,
            gp_noise: config.gp_noise,
            gp_max_points: config.gp_max_points,
            mlp_hidden: config.mlp_hidden,
            mlp_epochs: config.mlp_epochs,
            mlp_learning_rate: config.mlp_learning_rate,
        }
    }
}

/// A fitted regressor, ready for prediction and artifact serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FittedModel {
    Linear(LinearModel),
    Huber(LinearModel),
    Ransac(LinearModel),
    Knn(KnnModel),
    Gp(GpModel),
    Mlp(MlpModel),
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Linear(_) => ModelKind::Linear,
            FittedModel::Huber(_) => ModelKind::Huber,
            FittedModel::Ransac(_) => ModelKind::Ransac,
            FittedModel::Knn(_) => ModelKind::Knn,
            FittedModel::Gp(_) => ModelKind::Gp,
            FittedModel::Mlp(_) => ModelKind::Mlp,
        }
    }
}

/// Validate a row-major design matrix against its target vector.
fn validate_design(x: &[Vec<f64>], y: &[f64]) -> Result<usize, AppError> {
    if x.is_empty() {
        return Err(AppError::new(3, "No rows to fit."));
    }
    if x.len() != y.len() {
        return Err(AppError::new(
            4,
            format!("Design matrix has {} rows but {} targets.", x.len(), y.len()),
        ));
    }
    let p = x[0].len();
    if p == 0 {
        return Err(AppError::new(4, "Design matrix has zero columns."));
    }
    for row in x {
        if row.len() != p {
            return Err(AppError::new(4, "Ragged design matrix."));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(AppError::new(4, "Non-finite feature value."));
        }
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Non-finite target value."));
    }
    Ok(p)
}

/// Fit one model kind on a row-major design matrix.
pub fn fit_model(
    kind: ModelKind,
    x: &[Vec<f64>],
    y: &[f64],
    hp: &ModelHyperParams,
    seed: u64,
) -> Result<FittedModel, AppError> {
    validate_design(x, y)?;

    match kind {
        ModelKind::Linear => Ok(FittedModel::Linear(fit_ols(x, y)?)),
        ModelKind::Huber => Ok(FittedModel::Huber(fit_huber(
            x,
            y,
            hp.huber_delta,
            hp.huber_iters,
        )?)),
        ModelKind::Ransac => Ok(FittedModel::Ransac(fit_ransac(
            x,
            y,
            hp.ransac_min_fraction,
            hp.ransac_trials,
            seed,
        )?)),
        ModelKind::Knn => Ok(FittedModel::Knn(fit_knn(x, y, hp.knn_k)?)),
        ModelKind::Gp => Ok(FittedModel::Gp(fit_gp(
            x,
            y,
            hp.gp_length_scale,
            hp.gp_noise,
            hp.gp_max_points,
        )?)),
        ModelKind::Mlp => Ok(FittedModel::Mlp(fit_mlp(
            x,
            y,
            hp.mlp_hidden,
            hp.mlp_epochs,
            hp.mlp_learning_rate,
            seed,
        )?)),
    }
}

/// Predict over a row-major design matrix.
pub fn predict(model: &FittedModel, x: &[Vec<f64>]) -> Vec<f64> {
    match model {
        FittedModel::Linear(m) | FittedModel::Huber(m) | FittedModel::Ransac(m) => m.predict(x),
        FittedModel::Knn(m) => m.predict(x),
        FittedModel::Gp(m) => m.predict(x),
        FittedModel::Mlp(m) => m.predict(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hp() -> ModelHyperParams {
        ModelHyperParams {
            knn_k: 3,
            huber_delta: 1.35,
            huber_iters: 10,
            ransac_trials: 30,
            ransac_min_fraction: 0.3,
            gp_length_scale: 1.0,
            gp_noise: 0.1,
            gp_max_points: 128,
            mlp_hidden: 4,
            mlp_epochs: 50,
            mlp_learning_rate: 0.05,
        }
    }

    #[test]
    fn every_kind_fits_and_predicts_on_clean_data() {
        let x: Vec<Vec<f64>> = (0..24).map(|i| vec![i as f64 / 4.0]).collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] + 1.0).collect();

        for kind in [
            ModelKind::Linear,
            ModelKind::Huber,
            ModelKind::Ransac,
            ModelKind::Knn,
            ModelKind::Gp,
            ModelKind::Mlp,
        ] {
            let model = fit_model(kind, &x, &y, &hp(), 7).unwrap();
            assert_eq!(model.kind(), kind);
            let pred = predict(&model, &x);
            assert_eq!(pred.len(), x.len());
            assert!(pred.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn ragged_or_empty_design_is_rejected() {
        let hp = hp();
        assert!(fit_model(ModelKind::Linear, &[], &[], &hp, 0).is_err());
        let ragged = vec![vec![1.0], vec![1.0, 2.0]];
        assert!(fit_model(ModelKind::Linear, &ragged, &[1.0, 2.0], &hp, 0).is_err());
        let bad = vec![vec![f64::NAN], vec![1.0]];
        assert!(fit_model(ModelKind::Linear, &bad, &[1.0, 2.0], &hp, 0).is_err());
    }

    #[test]
    fn fitted_model_round_trips_through_json() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 * r[0]).collect();
        let model = fit_model(ModelKind::Linear, &x, &y, &hp(), 0).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let back: FittedModel = serde_json::from_str(&json).unwrap();
        let a = predict(&model, &x);
        let b = predict(&back, &x);
        for (u, v) in a.iter().zip(b.iter()) {
            assert!((u - v).abs() < 1e-12);
        }
    }
}
