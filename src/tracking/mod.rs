//! Experiment tracking.
//!
//! One run is recorded per invocation: its parameters, metrics, artifact
//! paths, and terminal status. Two backends exist:
//!
//! - `local`: a file-backed store writing one JSON document per run
//! - `mlflow`: a client for the MLflow REST API (used by both the
//!   `itu-training` and `azure` tracking servers)

pub mod local;
pub mod mlflow;

pub use local::*;
pub use mlflow::*;

use crate::domain::TrackingServer;
use crate::error::AppError;

/// Address of the shared MLflow server at ITU.
const ITU_TRACKING_URI: &str = "http://training.itu.dk:5000";

/// Terminal status of a tracked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// The selected tracking backend.
pub enum Tracker {
    Local(LocalTracker),
    Mlflow(MlflowTracker),
}

impl Tracker {
    /// Build the backend selected on the command line.
    ///
    /// For `itu-training` this also exports the S3 artifact-store credentials
    /// expected by the MLflow server, sourced from the environment/`.env`
    /// rather than hardcoded.
    pub fn from_config(server: TrackingServer, experiment: &str) -> Result<Self, AppError> {
        match server {
            TrackingServer::Local => Ok(Tracker::Local(LocalTracker::new(
                "./experiments",
                experiment,
            ))),
            TrackingServer::ItuTraining => {
                configure_itu_artifact_store()?;
                Ok(Tracker::Mlflow(MlflowTracker::new(
                    ITU_TRACKING_URI,
                    experiment,
                )))
            }
            TrackingServer::Azure => {
                dotenvy::dotenv().ok();
                let uri = std::env::var("AZUREML_MLFLOW_TRACKING_URI").map_err(|_| {
                    AppError::new(
                        2,
                        "Missing AZUREML_MLFLOW_TRACKING_URI. Resolve it with \
                         `az ml workspace show --query mlflow_tracking_uri` and export it.",
                    )
                })?;
                Ok(Tracker::Mlflow(MlflowTracker::new(&uri, experiment)))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Tracker::Local(_) => "local",
            Tracker::Mlflow(_) => "mlflow",
        }
    }

    pub fn start_run(&mut self, run_name: &str) -> Result<String, AppError> {
        match self {
            Tracker::Local(t) => t.start_run(run_name),
            Tracker::Mlflow(t) => t.start_run(run_name),
        }
    }

    pub fn log_param(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        match self {
            Tracker::Local(t) => t.log_param(key, value),
            Tracker::Mlflow(t) => t.log_param(key, value),
        }
    }

    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<(), AppError> {
        match self {
            Tracker::Local(t) => t.log_metric(key, value),
            Tracker::Mlflow(t) => t.log_metric(key, value),
        }
    }

    pub fn log_artifact(&mut self, path: &str) -> Result<(), AppError> {
        match self {
            Tracker::Local(t) => t.log_artifact(path),
            Tracker::Mlflow(t) => t.log_artifact(path),
        }
    }

    pub fn end_run(&mut self, status: RunStatus) -> Result<(), AppError> {
        match self {
            Tracker::Local(t) => t.end_run(status),
            Tracker::Mlflow(t) => t.end_run(status),
        }
    }
}

/// Export the S3 credentials the ITU MLflow server expects for artifacts.
fn configure_itu_artifact_store() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let endpoint = require_env("WINDCAST_S3_ENDPOINT")?;
    let access_key = require_env("WINDCAST_S3_ACCESS_KEY")?;
    let secret_key = require_env("WINDCAST_S3_SECRET_KEY")?;

    // `set_var` is unsafe in edition 2024; we are still on the main thread,
    // before the rayon pool or any HTTP client spins up.
    unsafe {
        std::env::set_var("MLFLOW_S3_ENDPOINT_URL", endpoint);
        std::env::set_var("AWS_ACCESS_KEY_ID", access_key);
        std::env::set_var("AWS_SECRET_ACCESS_KEY", secret_key);
    }

    Ok(())
}

fn require_env(name: &str) -> Result<String, AppError> {
    std::env::var(name)
        .map_err(|_| AppError::new(2, format!("Missing {name} in environment (.env).")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_strings_match_mlflow() {
        assert_eq!(RunStatus::Finished.as_str(), "FINISHED");
        assert_eq!(RunStatus::Failed.as_str(), "FAILED");
    }

    #[test]
    fn local_backend_needs_no_environment() {
        let tracker = Tracker::from_config(TrackingServer::Local, "exp").unwrap();
        assert_eq!(tracker.backend_name(), "local");
    }
}
