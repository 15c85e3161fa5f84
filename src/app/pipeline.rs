//! Shared experiment pipeline used by the `run` and `rank` front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> split -> grid search -> refit winner -> holdout evaluation
//!
//! The front-ends then focus on presentation and tracking.

use chrono::Utc;
use tracing::info;

use crate::data::{chronological_split, compute_stats, generate_sample, WindClient};
use crate::domain::{DatasetStats, HoldoutMetrics, SearchConfig};
use crate::error::AppError;
use crate::features::targets;
use crate::io::{ForecastGrid, ModelFile};
use crate::metrics;
use crate::models::FittedModel;
use crate::search::{refit_best, run_search, SearchSelection};

/// All computed outputs of a single experiment run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stats: DatasetStats,
    pub n_train: usize,
    pub n_test: usize,
    pub rows_skipped: usize,
    pub selection: SearchSelection,
    pub model: FittedModel,
    pub holdout: ForecastGrid,
    pub metrics: HoldoutMetrics,
}

/// Execute the full experiment pipeline and return the computed outputs.
pub fn run_experiment(config: &SearchConfig) -> Result<RunOutput, AppError> {
    // 1) Retrieve the wind series.
    let (observations, rows_skipped) = if config.offline {
        (generate_sample(config)?, 0)
    } else {
        let fetched = WindClient::from_env()?.fetch_observations(config.days)?;
        (fetched.observations, fetched.rows_skipped)
    };
    info!("retrieved {} observations", observations.len());

    let stats = compute_stats(&observations)
        .ok_or_else(|| AppError::new(3, "No observations to fit."))?;

    // 2) Chronological train/test split.
    let (train, test) = chronological_split(&observations, config.test_fraction)?;

    // 3) Grid search under expanding-window cross-validation.
    let selection = run_search(&train, config)?;
    info!(
        "best pipeline: {} (cv_mape={:.4})",
        selection.best.spec.label(),
        selection.best.cv_mape
    );

    // 4) Refit the winner on the full training window.
    let (pipeline, model) = refit_best(&train, &selection.best.spec, config)?;

    // 5) Evaluate on the holdout window.
    let x_test = pipeline.transform(&test)?;
    let predicted = crate::models::predict(&model, &x_test);
    let observed = targets(&test);

    let metrics = HoldoutMetrics {
        test_mse: metrics::mse(&observed, &predicted)?,
        test_rmse: metrics::rmse(&observed, &predicted)?,
        test_mape: metrics::mape(&observed, &predicted)?,
    };

    let holdout = ForecastGrid {
        timestamps: test.iter().map(|o| o.timestamp).collect(),
        observed,
        predicted,
    };

    Ok(RunOutput {
        stats,
        n_train: train.len(),
        n_test: test.len(),
        rows_skipped,
        selection,
        model,
        holdout,
        metrics,
    })
}

/// Assemble the portable artifact for a finished run.
pub fn build_artifact(output: &RunOutput, config: &SearchConfig) -> ModelFile {
    ModelFile {
        tool: "windcast".to_string(),
        created: Utc::now(),
        experiment: config.experiment.clone(),
        days: config.days,
        spec: output.selection.best.spec,
        cv_mape: output.selection.best.cv_mape,
        metrics: output.metrics.clone(),
        holdout: output.holdout.clone(),
        model: output.model.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelFilter, TrackingServer};

    fn offline_config() -> SearchConfig {
        SearchConfig {
            tracking_server: TrackingServer::Local,
            experiment: "offline-test".to_string(),
            days: 7,
            offline: true,
            sample_count: 240,
            seed: 42,
            folds: 3,
            test_fraction: 0.2,
            model_filter: ModelFilter::Linear,
            poly_degree: 2,
            wavelet_level: 2,
            knn_k: 3,
            huber_delta: 1.35,
            huber_iters: 10,
            ransac_trials: 30,
            ransac_min_fraction: 0.3,
            gp_length_scale: 1.0,
            gp_noise: 0.1,
            gp_max_points: 128,
            mlp_hidden: 4,
            mlp_epochs: 30,
            mlp_learning_rate: 0.05,
            top_n: 5,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_model: None,
        }
    }

    #[test]
    fn offline_experiment_runs_end_to_end() {
        let config = offline_config();
        let output = run_experiment(&config).unwrap();

        assert_eq!(output.n_train + output.n_test, config.sample_count);
        assert_eq!(output.holdout.observed.len(), output.n_test);
        assert_eq!(output.holdout.predicted.len(), output.n_test);
        assert!(output.metrics.test_mse.is_finite());
        assert!(output.metrics.test_rmse >= 0.0);
        assert!(output.selection.best.cv_mape.is_finite());
        assert!(!output.selection.leaderboard.is_empty());
    }

    #[test]
    fn artifact_mirrors_the_run_output() {
        let config = offline_config();
        let output = run_experiment(&config).unwrap();
        let artifact = build_artifact(&output, &config);

        assert_eq!(artifact.tool, "windcast");
        assert_eq!(artifact.spec, output.selection.best.spec);
        assert_eq!(artifact.holdout.observed.len(), output.n_test);
        assert_eq!(artifact.experiment, "offline-test");
    }
}
