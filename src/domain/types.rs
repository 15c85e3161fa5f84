//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the search
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which experiment-tracking backend records the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingServer {
    /// File-backed store under `./experiments/`.
    Local,
    /// MLflow server at ITU (`http://training.itu.dk:5000`) with an
    /// S3-compatible artifact store configured via environment variables.
    #[value(name = "itu-training")]
    ItuTraining,
    /// MLflow endpoint of an Azure ML workspace
    /// (tracking URI from `AZUREML_MLFLOW_TRACKING_URI`).
    Azure,
}

impl TrackingServer {
    pub fn display_name(self) -> &'static str {
        match self {
            TrackingServer::Local => "local",
            TrackingServer::ItuTraining => "itu-training",
            TrackingServer::Azure => "azure",
        }
    }
}

/// Which regressor(s) the grid sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelFilter {
    All,
    Linear,
    Huber,
    Ransac,
    Knn,
    Gp,
    Mlp,
}

impl ModelFilter {
    /// Concrete model kinds selected by this filter, in grid order.
    pub fn kinds(self) -> Vec<ModelKind> {
        match self {
            ModelFilter::All => vec![
                ModelKind::Linear,
                ModelKind::Huber,
                ModelKind::Ransac,
                ModelKind::Knn,
                ModelKind::Gp,
                ModelKind::Mlp,
            ],
            ModelFilter::Linear => vec![ModelKind::Linear],
            ModelFilter::Huber => vec![ModelKind::Huber],
            ModelFilter::Ransac => vec![ModelKind::Ransac],
            ModelFilter::Knn => vec![ModelKind::Knn],
            ModelFilter::Gp => vec![ModelKind::Gp],
            ModelFilter::Mlp => vec![ModelKind::Mlp],
        }
    }
}

/// Concrete regressor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Huber,
    Ransac,
    Knn,
    Gp,
    Mlp,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Huber => "huber",
            ModelKind::Ransac => "ransac",
            ModelKind::Knn => "knn",
            ModelKind::Gp => "gp",
            ModelKind::Mlp => "mlp",
        }
    }
}

/// How the timestamp column enters the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeEncoding {
    /// Timestamp contributes no features.
    Drop,
    /// Hours since the start of the training window (one feature).
    Raw,
    /// Cyclic hour-of-day and day-of-year features (four features).
    Calendar,
}

impl TimeEncoding {
    pub const ALL: [TimeEncoding; 3] =
        [TimeEncoding::Drop, TimeEncoding::Raw, TimeEncoding::Calendar];

    pub fn display_name(self) -> &'static str {
        match self {
            TimeEncoding::Drop => "drop",
            TimeEncoding::Raw => "raw",
            TimeEncoding::Calendar => "calendar",
        }
    }
}

/// How the wind-speed column enters the design matrix.
///
/// Speed is the primary predictor and is never dropped, so every candidate
/// pipeline has a non-empty feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedEncoding {
    /// Pass the measured speed through unchanged.
    Raw,
    /// Standardize with train-window mean/std.
    Standardized,
    /// Polynomial powers `speed^1 ..= speed^degree`.
    Polynomial,
    /// Multi-level Haar wavelet denoising of the speed series.
    Wavelet,
}

impl SpeedEncoding {
    pub const ALL: [SpeedEncoding; 4] = [
        SpeedEncoding::Raw,
        SpeedEncoding::Standardized,
        SpeedEncoding::Polynomial,
        SpeedEncoding::Wavelet,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SpeedEncoding::Raw => "raw",
            SpeedEncoding::Standardized => "standardized",
            SpeedEncoding::Polynomial => "polynomial",
            SpeedEncoding::Wavelet => "wavelet",
        }
    }
}

/// How the compass-direction column enters the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionEncoding {
    /// Direction contributes no features.
    Drop,
    /// Compass label mapped to degrees (one feature).
    Sector,
    /// Degrees decomposed into sin/cos components (two features).
    Cartesian,
}

impl DirectionEncoding {
    pub const ALL: [DirectionEncoding; 3] = [
        DirectionEncoding::Drop,
        DirectionEncoding::Sector,
        DirectionEncoding::Cartesian,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            DirectionEncoding::Drop => "drop",
            DirectionEncoding::Sector => "sector",
            DirectionEncoding::Cartesian => "cartesian",
        }
    }
}

/// One candidate pipeline in the search grid: per-column preprocessing plus a
/// regressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub time: TimeEncoding,
    pub speed: SpeedEncoding,
    pub direction: DirectionEncoding,
    pub model: ModelKind,
}

impl PipelineSpec {
    /// Compact label for tables and logs, e.g. `calendar|wavelet|cartesian|gp`.
    pub fn label(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.time.display_name(),
            self.speed.display_name(),
            self.direction.display_name(),
            self.model.display_name()
        )
    }
}

/// A normalized wind measurement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    /// Wind speed in m/s.
    pub speed: f64,
    /// 16-point compass label (e.g. `NNE`).
    pub direction: String,
    /// Total generated power in kW.
    pub power: f64,
}

/// Summary stats about the observations actually used for the run.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_obs: usize,
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub speed_min: f64,
    pub speed_max: f64,
    pub power_min: f64,
    pub power_max: f64,
}

/// Holdout-window metrics for the winning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub test_mse: f64,
    pub test_rmse: f64,
    pub test_mape: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub tracking_server: TrackingServer,
    pub experiment: String,
    pub days: u32,

    /// Use the synthetic generator instead of the measurement API.
    pub offline: bool,
    pub sample_count: usize,
    pub seed: u64,

    pub folds: usize,
    pub test_fraction: f64,
    pub model_filter: ModelFilter,

    pub poly_degree: usize,
    pub wavelet_level: usize,
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

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_label_is_compact() {
        let spec = PipelineSpec {
            time: TimeEncoding::Calendar,
            speed: SpeedEncoding::Wavelet,
            direction: DirectionEncoding::Cartesian,
            model: ModelKind::Gp,
        };
        assert_eq!(spec.label(), "calendar|wavelet|cartesian|gp");
    }

    #[test]
    fn model_filter_all_covers_every_kind() {
        let kinds = ModelFilter::All.kinds();
        assert_eq!(kinds.len(), 6);
        assert_eq!(kinds[0], ModelKind::Linear);
        assert_eq!(kinds[5], ModelKind::Mlp);
    }
}
