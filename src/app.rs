//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - selects the tracking backend
//! - fetches measurement data (or generates a synthetic series)
//! - runs the pipeline grid search + holdout evaluation
//! - logs the run (params, metrics, model artifact)
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, RunArgs};
use crate::domain::SearchConfig;
use crate::error::AppError;
use crate::tracking::{RunStatus, Tracker};

pub mod pipeline;

/// Entry point for the `windcast` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // We want bare `windcast` and `windcast --days 30` to behave like
    // `windcast run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the one-shot-script UX of the original workflow.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Rank(args) => handle_rank(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init so tests (and repeated calls) don't panic on double-install.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = search_config_from_args(&args);

    info!(
        "running pipeline search on tracking server: {} with {} days of data",
        config.tracking_server.display_name(),
        config.days
    );

    let mut tracker = Tracker::from_config(config.tracking_server, &config.experiment)?;
    let run_id = tracker.start_run("pipeline-grid-search")?;

    // Mark the run failed on the backend before propagating any error.
    let output = match pipeline::run_experiment(&config) {
        Ok(output) => output,
        Err(err) => {
            let _ = tracker.end_run(RunStatus::Failed);
            return Err(err);
        }
    };

    tracker.log_param("days", &config.days.to_string())?;
    tracker.log_param("folds", &config.folds.to_string())?;
    tracker.log_param("grid_size", &output.selection.grid_size.to_string())?;
    tracker.log_param(
        "model_filter",
        &format!("{:?}", config.model_filter).to_lowercase(),
    )?;
    tracker.log_param("pipeline", &output.selection.best.spec.label())?;
    tracker.log_param("seed", &config.seed.to_string())?;

    info!("logging model");
    let artifact = pipeline::build_artifact(&output, &config);
    let artifact_path = match &config.export_model {
        Some(path) => path.clone(),
        None => std::path::PathBuf::from(format!("artifacts/model_{run_id}.json")),
    };
    crate::io::write_model_json(&artifact_path, &artifact)?;
    tracker.log_artifact(&artifact_path.display().to_string())?;

    info!("logging metrics");
    tracker.log_metric("cv_mape", output.selection.best.cv_mape)?;
    tracker.log_metric("test_mse", output.metrics.test_mse)?;
    tracker.log_metric("test_rmse", output.metrics.test_rmse)?;
    tracker.log_metric("test_mape", output.metrics.test_mape)?;

    tracker.end_run(RunStatus::Finished)?;

    print_run_output(&output, &config)?;

    info!("done");
    Ok(())
}

fn handle_rank(args: RunArgs) -> Result<(), AppError> {
    let config = search_config_from_args(&args);
    let output = pipeline::run_experiment(&config)?;

    println!(
        "{}",
        crate::report::format_leaderboard(&output.selection.leaderboard, config.top_n)
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let artifact = crate::io::read_model_json(&args.model)?;
    let plot = crate::plot::render_forecast_plot(&artifact.holdout, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn print_run_output(output: &pipeline::RunOutput, config: &SearchConfig) -> Result<(), AppError> {
    println!(
        "{}",
        crate::report::format_run_summary(
            &output.stats,
            output.n_train,
            output.n_test,
            &output.selection,
            &output.metrics,
            config,
        )
    );
    println!(
        "{}",
        crate::report::format_leaderboard(&output.selection.leaderboard, config.top_n)
    );

    if config.plot {
        let plot = crate::plot::render_forecast_plot(
            &output.holdout,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::write_leaderboard_csv(path, &output.selection.leaderboard)?;
    }

    Ok(())
}

pub fn search_config_from_args(args: &RunArgs) -> SearchConfig {
    SearchConfig {
        tracking_server: args.tracking_server,
        experiment: args.experiment.clone(),
        days: args.days,
        offline: args.offline,
        sample_count: args.sample_count,
        seed: args.seed,
        folds: args.folds,
        test_fraction: args.test_fraction,
        model_filter: args.model,
        poly_degree: args.poly_degree,
        wavelet_level: args.wavelet_level,
        knn_k: args.knn_k,
        huber_delta: args.huber_delta,
        huber_iters: args.huber_iters,
        ransac_trials: args.ransac_trials,
        ransac_min_fraction: args.ransac_min_fraction,
        gp_length_scale: args.gp_length_scale,
        gp_noise: args.gp_noise,
        gp_max_points: args.gp_max_points,
        mlp_hidden: args.mlp_hidden,
        mlp_epochs: args.mlp_epochs,
        mlp_learning_rate: args.mlp_learning_rate,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_model: args.export_model.clone(),
    }
}

/// Rewrite argv so `windcast` defaults to `windcast run`.
///
/// Rules:
/// - `windcast`                     -> `windcast run`
/// - `windcast --days 30 ...`       -> `windcast run --days 30 ...`
/// - `windcast --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "rank" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
