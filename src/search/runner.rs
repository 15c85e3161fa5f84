//! Candidate evaluation and selection.
//!
//! Each grid candidate is evaluated independently (parallel fan-out) against
//! the same fold layout. Candidates that cannot be fit (underdetermined
//! design, singular solves, degenerate slices) are skipped with a recorded
//! reason rather than failing the run; only an empty survivor set is fatal.
//! Selection is the minimum mean CV MAPE with ties broken by grid index, so a
//! run is fully reproducible for a fixed seed.

use rayon::prelude::*;
use tracing::info;

use crate::domain::{Observation, PipelineSpec, SearchConfig};
use crate::error::AppError;
use crate::features::{targets, FeaturePipeline};
use crate::metrics;
use crate::models::{fit_model, FittedModel, ModelHyperParams};
use crate::search::cv::{time_series_folds, Fold};
use crate::search::grid::build_grid;

/// Minimum number of training rows beyond the feature count.
const MIN_N_BUFFER: usize = 5;

/// CV outcome for one surviving candidate.
#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub idx: usize,
    pub spec: PipelineSpec,
    /// Mean MAPE across folds.
    pub cv_mape: f64,
    pub fold_mape: Vec<f64>,
}

/// Output of evaluating the whole grid.
#[derive(Debug, Clone)]
pub struct SearchSelection {
    pub best: CandidateResult,
    /// All surviving candidates sorted by ascending CV MAPE.
    pub leaderboard: Vec<CandidateResult>,
    /// Candidates that were skipped and why (for diagnostics).
    pub skipped: Vec<(PipelineSpec, String)>,
    pub grid_size: usize,
}

/// Evaluate the full grid against the training window.
pub fn run_search(
    train: &[Observation],
    config: &SearchConfig,
) -> Result<SearchSelection, AppError> {
    validate_search_config(config)?;

    let folds = time_series_folds(train.len(), config.folds)?;
    let grid = build_grid(config);
    let hp = ModelHyperParams::from_config(config);

    info!(
        "grid search: {} candidates x {} folds on {} training rows",
        grid.len(),
        folds.len(),
        train.len()
    );

    let outcomes: Vec<Result<CandidateResult, (PipelineSpec, String)>> = grid
        .par_iter()
        .enumerate()
        .map(|(idx, spec)| evaluate_candidate(idx, spec, train, &folds, config, &hp))
        .collect();

    let mut survivors = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => survivors.push(result),
            Err(reason) => skipped.push(reason),
        }
    }

    if survivors.is_empty() {
        return Err(AppError::new(
            3,
            "No pipeline survived cross-validation; every candidate was skipped.",
        ));
    }

    // Deterministic selection: minimum CV MAPE, ties broken by grid index.
    let mut best = &survivors[0];
    for c in &survivors[1..] {
        if c.cv_mape < best.cv_mape || (c.cv_mape == best.cv_mape && c.idx < best.idx) {
            best = c;
        }
    }
    let best = best.clone();

    let mut leaderboard = survivors;
    leaderboard.sort_by(|a, b| {
        a.cv_mape
            .partial_cmp(&b.cv_mape)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.idx.cmp(&b.idx))
    });

    Ok(SearchSelection {
        best,
        leaderboard,
        skipped,
        grid_size: grid.len(),
    })
}

/// Refit the winning candidate on the full training window.
pub fn refit_best(
    train: &[Observation],
    spec: &PipelineSpec,
    config: &SearchConfig,
) -> Result<(FeaturePipeline, FittedModel), AppError> {
    let hp = ModelHyperParams::from_config(config);
    let mut pipeline = FeaturePipeline::new(spec, config);
    pipeline.fit(train)?;
    let x = pipeline.transform(train)?;
    let y = targets(train);
    let model = fit_model(spec.model, &x, &y, &hp, candidate_seed(config.seed, 0))?;
    Ok((pipeline, model))
}

fn evaluate_candidate(
    idx: usize,
    spec: &PipelineSpec,
    train: &[Observation],
    folds: &[Fold],
    config: &SearchConfig,
    hp: &ModelHyperParams,
) -> Result<CandidateResult, (PipelineSpec, String)> {
    let seed = candidate_seed(config.seed, idx);
    let mut fold_mape = Vec::with_capacity(folds.len());

    for fold in folds {
        let tr = &train[..fold.train_end];
        let val = &train[fold.val_start..fold.val_end];

        let mut pipeline = FeaturePipeline::new(spec, config);
        pipeline.fit(tr).map_err(|e| (*spec, e.to_string()))?;

        if tr.len() < pipeline.n_features() + MIN_N_BUFFER {
            return Err((
                *spec,
                format!(
                    "Underdetermined: n={} < p+{MIN_N_BUFFER}={}",
                    tr.len(),
                    pipeline.n_features() + MIN_N_BUFFER
                ),
            ));
        }

        let x_train = pipeline.transform(tr).map_err(|e| (*spec, e.to_string()))?;
        let y_train = targets(tr);
        let model =
            fit_model(spec.model, &x_train, &y_train, hp, seed).map_err(|e| (*spec, e.to_string()))?;

        let x_val = pipeline.transform(val).map_err(|e| (*spec, e.to_string()))?;
        let predictions = crate::models::predict(&model, &x_val);
        let score = metrics::mape(&targets(val), &predictions).map_err(|e| (*spec, e.to_string()))?;

        if !score.is_finite() {
            return Err((*spec, "Non-finite CV score.".to_string()));
        }
        fold_mape.push(score);
    }

    let cv_mape = fold_mape.iter().sum::<f64>() / fold_mape.len() as f64;
    Ok(CandidateResult {
        idx,
        spec: *spec,
        cv_mape,
        fold_mape,
    })
}

/// Per-candidate seed: stable for a given run seed and grid position.
fn candidate_seed(seed: u64, idx: usize) -> u64 {
    seed ^ (idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn validate_search_config(config: &SearchConfig) -> Result<(), AppError> {
    if config.poly_degree == 0 {
        return Err(AppError::new(2, "Polynomial degree must be >= 1."));
    }
    if config.wavelet_level == 0 {
        return Err(AppError::new(2, "Wavelet level must be >= 1."));
    }
    if config.knn_k == 0 {
        return Err(AppError::new(2, "KNN k must be >= 1."));
    }
    Ok(())
}
