//! File-backed run store.
//!
//! Each finished run becomes one pretty-printed JSON document under
//! `<root>/<experiment>/<run_id>.json`, so results stay greppable and
//! diffable without a server.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tracking::RunStatus;

/// A run in progress (and its on-disk form once finished).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalRun {
    pub run_id: String,
    pub run_name: String,
    pub experiment: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// BTreeMaps keep the serialized document stable across runs.
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub artifacts: Vec<String>,
    pub status: String,
}

pub struct LocalTracker {
    root: PathBuf,
    experiment: String,
    current: Option<LocalRun>,
}

impl LocalTracker {
    pub fn new(root: impl Into<PathBuf>, experiment: &str) -> Self {
        Self {
            root: root.into(),
            experiment: experiment.to_string(),
            current: None,
        }
    }

    pub fn start_run(&mut self, run_name: &str) -> Result<String, AppError> {
        let start_time = Utc::now();
        let run_id = format!("run_{}", start_time.format("%Y%m%d_%H%M%S_%3f"));
        self.current = Some(LocalRun {
            run_id: run_id.clone(),
            run_name: run_name.to_string(),
            experiment: self.experiment.clone(),
            start_time,
            end_time: None,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
            status: "RUNNING".to_string(),
        });
        Ok(run_id)
    }

    fn current_mut(&mut self) -> Result<&mut LocalRun, AppError> {
        self.current
            .as_mut()
            .ok_or_else(|| AppError::new(4, "No active run; call start_run first."))
    }

    pub fn log_param(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.current_mut()?
            .params
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<(), AppError> {
        self.current_mut()?.metrics.insert(key.to_string(), value);
        Ok(())
    }

    pub fn log_artifact(&mut self, path: &str) -> Result<(), AppError> {
        self.current_mut()?.artifacts.push(path.to_string());
        Ok(())
    }

    /// Finish the run and persist it.
    pub fn end_run(&mut self, status: RunStatus) -> Result<(), AppError> {
        let mut run = self
            .current
            .take()
            .ok_or_else(|| AppError::new(4, "No active run; call start_run first."))?;
        run.end_time = Some(Utc::now());
        run.status = status.as_str().to_string();

        let dir = self.root.join(&self.experiment);
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::new(
                4,
                format!("Failed to create experiment dir '{}': {e}", dir.display()),
            )
        })?;

        let path = dir.join(format!("{}.json", run.run_id));
        let file = fs::File::create(&path).map_err(|e| {
            AppError::new(4, format!("Failed to create run file '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(file, &run)
            .map_err(|e| AppError::new(4, format!("Failed to write run file: {e}")))?;

        Ok(())
    }
}
