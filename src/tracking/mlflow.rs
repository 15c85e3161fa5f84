//! MLflow REST client (tracking API v2.0).
//!
//! Only the handful of endpoints a one-shot experiment needs:
//! get-or-create experiment, create run, log parameter/metric, set tag,
//! update run status. Artifact *bytes* are not uploaded over REST (the
//! artifact store is S3-side), so the model path is recorded as a run tag.

use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tracking::RunStatus;

pub struct MlflowTracker {
    client: Client,
    base_url: String,
    experiment: String,
    run_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: ExperimentInfo,
}

#[derive(Debug, Deserialize)]
struct ExperimentInfo {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct CreateExperimentRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    experiment_id: &'a str,
    run_name: &'a str,
    start_time: i64,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: RunEnvelope,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

#[derive(Debug, Serialize)]
struct LogParamRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct LogMetricRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: i64,
}

#[derive(Debug, Serialize)]
struct SetTagRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRunRequest<'a> {
    run_id: &'a str,
    status: &'a str,
    end_time: i64,
}

impl MlflowTracker {
    pub fn new(base_url: &str, experiment: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            experiment: experiment.to_string(),
            run_id: None,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{path}", self.base_url)
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::blocking::Response, AppError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .map_err(|e| AppError::new(4, format!("MLflow request '{path}' failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("MLflow request '{path}' failed with status {}.", resp.status()),
            ));
        }
        Ok(resp)
    }

    /// Resolve the experiment id, creating the experiment on first use.
    fn ensure_experiment(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .get(self.endpoint("experiments/get-by-name"))
            .query(&[("experiment_name", self.experiment.as_str())])
            .send()
            .map_err(|e| AppError::new(4, format!("MLflow experiment lookup failed: {e}")))?;

        if resp.status().is_success() {
            let body: GetExperimentResponse = resp.json().map_err(|e| {
                AppError::new(4, format!("Failed to parse MLflow experiment response: {e}"))
            })?;
            return Ok(body.experiment.experiment_id);
        }

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            let created: CreateExperimentResponse = self
                .post(
                    "experiments/create",
                    &CreateExperimentRequest {
                        name: &self.experiment,
                    },
                )?
                .json()
                .map_err(|e| {
                    AppError::new(4, format!("Failed to parse MLflow create response: {e}"))
                })?;
            return Ok(created.experiment_id);
        }

        Err(AppError::new(
            4,
            format!("MLflow experiment lookup failed with status {}.", resp.status()),
        ))
    }

    fn current_run_id(&self) -> Result<&str, AppError> {
        self.run_id
            .as_deref()
            .ok_or_else(|| AppError::new(4, "No active run; call start_run first."))
    }

    pub fn start_run(&mut self, run_name: &str) -> Result<String, AppError> {
        let experiment_id = self.ensure_experiment()?;
        let body: CreateRunResponse = self
            .post(
                "runs/create",
                &CreateRunRequest {
                    experiment_id: &experiment_id,
                    run_name,
                    start_time: now_millis(),
                },
            )?
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse MLflow run response: {e}")))?;

        let run_id = body.run.info.run_id;
        self.run_id = Some(run_id.clone());
        Ok(run_id)
    }

    pub fn log_param(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let run_id = self.current_run_id()?.to_string();
        self.post(
            "runs/log-parameter",
            &LogParamRequest {
                run_id: &run_id,
                key,
                value,
            },
        )?;
        Ok(())
    }

    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<(), AppError> {
        let run_id = self.current_run_id()?.to_string();
        self.post(
            "runs/log-metric",
            &LogMetricRequest {
                run_id: &run_id,
                key,
                value,
                timestamp: now_millis(),
                step: 0,
            },
        )?;
        Ok(())
    }

    pub fn log_artifact(&mut self, path: &str) -> Result<(), AppError> {
        let run_id = self.current_run_id()?.to_string();
        self.post(
            "runs/set-tag",
            &SetTagRequest {
                run_id: &run_id,
                key: "windcast.artifact_path",
                value: path,
            },
        )?;
        Ok(())
    }

    pub fn end_run(&mut self, status: RunStatus) -> Result<(), AppError> {
        let run_id = self.current_run_id()?.to_string();
        self.post(
            "runs/update",
            &UpdateRunRequest {
                run_id: &run_id,
                status: status.as_str(),
                end_time: now_millis(),
            },
        )?;
        self.run_id = None;
        Ok(())
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_rooted_at_the_rest_prefix() {
        let tracker = MlflowTracker::new("http://training.itu.dk:5000/", "exp");
        assert_eq!(
            tracker.endpoint("runs/create"),
            "http://training.itu.dk:5000/api/2.0/mlflow/runs/create"
        );
    }

    #[test]
    fn payloads_serialize_with_mlflow_field_names() {
        let metric = LogMetricRequest {
            run_id: "abc",
            key: "test_mse",
            value: 1.5,
            timestamp: 42,
            step: 0,
        };
        let v = serde_json::to_value(&metric).unwrap();
        assert_eq!(v["run_id"], "abc");
        assert_eq!(v["key"], "test_mse");
        assert_eq!(v["value"], 1.5);
        assert_eq!(v["timestamp"], 42);

        let update = UpdateRunRequest {
            run_id: "abc",
            status: RunStatus::Finished.as_str(),
            end_time: 99,
        };
        let v = serde_json::to_value(&update).unwrap();
        assert_eq!(v["status"], "FINISHED");
    }

    #[test]
    fn run_responses_deserialize() {
        let json = r#"{"run": {"info": {"run_id": "r-123", "status": "RUNNING"}}}"#;
        let parsed: CreateRunResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.run.info.run_id, "r-123");

        let json = r#"{"experiment": {"experiment_id": "7", "name": "exp"}}"#;
        let parsed: GetExperimentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.experiment.experiment_id, "7");
    }

    #[test]
    fn logging_without_a_run_is_an_error() {
        let mut tracker = MlflowTracker::new("http://localhost:5000", "exp");
        assert!(tracker.log_param("k", "v").is_err());
        assert!(tracker.log_metric("m", 1.0).is_err());
        assert!(tracker.end_run(RunStatus::Failed).is_err());
    }
}
