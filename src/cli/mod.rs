//! Command-line parsing for the wind-power pipeline search.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the search/tracking code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelFilter, TrackingServer};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "windcast", version, about = "Wind-power forecasting pipeline search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full experiment: search, holdout evaluation, tracking, report.
    Run(RunArgs),
    /// Print the cross-validation leaderboard only (no tracking backend).
    Rank(RunArgs),
    /// Plot a previously exported model artifact JSON.
    Plot(PlotArgs),
}

/// Common options for running and ranking.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Tracking server to record the run on.
    #[arg(long = "tracking-server", value_enum, default_value_t = TrackingServer::Local)]
    pub tracking_server: TrackingServer,

    /// Number of days of data to pull from the measurement service.
    #[arg(long, default_value_t = 90)]
    pub days: u32,

    /// Experiment name on the tracking backend.
    #[arg(long, default_value = "orkney-windpower")]
    pub experiment: String,

    /// Number of expanding-window cross-validation folds.
    #[arg(long, default_value_t = 5)]
    pub folds: usize,

    /// Fraction of the series held out chronologically for the test window.
    #[arg(long = "test-fraction", default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Which regressor(s) the grid sweeps.
    #[arg(long, value_enum, default_value_t = ModelFilter::All)]
    pub model: ModelFilter,

    /// Degree for the polynomial speed encoding.
    #[arg(long = "poly-degree", default_value_t = 3)]
    pub poly_degree: usize,

    /// Haar decomposition depth for the wavelet speed encoding.
    #[arg(long = "wavelet-level", default_value_t = 5)]
    pub wavelet_level: usize,

    /// Neighbour count for the KNN regressor.
    #[arg(long = "knn-k", default_value_t = 5)]
    pub knn_k: usize,

    /// Huber tuning constant (larger = less downweighting).
    #[arg(long = "huber-delta", default_value_t = 1.35)]
    pub huber_delta: f64,

    /// Number of Huber IRLS reweight iterations.
    #[arg(long = "huber-iters", default_value_t = 20)]
    pub huber_iters: usize,

    /// RANSAC subsample trials.
    #[arg(long = "ransac-trials", default_value_t = 100)]
    pub ransac_trials: usize,

    /// Minimum fraction of rows in each RANSAC subsample.
    #[arg(long = "ransac-min-fraction", default_value_t = 0.1)]
    pub ransac_min_fraction: f64,

    /// RBF length scale for the Gaussian-process regressor.
    #[arg(long = "gp-length-scale", default_value_t = 1.0)]
    pub gp_length_scale: f64,

    /// Observation noise added to the GP kernel diagonal.
    #[arg(long = "gp-noise", default_value_t = 0.1)]
    pub gp_noise: f64,

    /// Cap on GP training points (deterministic stride subsampling).
    #[arg(long = "gp-max-points", default_value_t = 512)]
    pub gp_max_points: usize,

    /// Hidden-layer width for the MLP regressor (two layers).
    #[arg(long = "mlp-hidden", default_value_t = 32)]
    pub mlp_hidden: usize,

    /// Full-batch gradient-descent epochs for the MLP.
    #[arg(long = "mlp-epochs", default_value_t = 300)]
    pub mlp_epochs: usize,

    /// Learning rate for the MLP.
    #[arg(long = "mlp-learning-rate", default_value_t = 0.01)]
    pub mlp_learning_rate: f64,

    /// Use the synthetic generator instead of the measurement API.
    #[arg(long)]
    pub offline: bool,

    /// Number of synthetic observations in offline mode (half-hourly cadence).
    #[arg(long = "sample-count", default_value_t = 4320)]
    pub sample_count: usize,

    /// Seed for the synthetic generator and the stochastic fitters.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Show top-N pipelines in the leaderboard.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render an ASCII plot of the holdout forecast (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the leaderboard to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the model artifact (spec + params + holdout grid) to JSON.
    #[arg(long = "export-model")]
    pub export_model: Option<PathBuf>,
}

/// Options for plotting a saved model artifact.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Model JSON file produced by `windcast run --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
