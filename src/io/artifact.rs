//! Read/write model artifact JSON files.
//!
//! The artifact is the "portable" representation of a finished run:
//! - the winning pipeline spec and its CV score
//! - run metadata (experiment, data window)
//! - holdout metrics and the holdout forecast grid for quick plotting
//! - the fitted model parameters themselves

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HoldoutMetrics, PipelineSpec};
use crate::error::AppError;
use crate::models::FittedModel;

/// Holdout window forecast: aligned timestamp/observed/predicted columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastGrid {
    pub timestamps: Vec<DateTime<Utc>>,
    pub observed: Vec<f64>,
    pub predicted: Vec<f64>,
}

/// A saved model artifact (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub created: DateTime<Utc>,
    pub experiment: String,
    pub days: u32,
    pub spec: PipelineSpec,
    pub cv_mape: f64,
    pub metrics: HoldoutMetrics,
    pub holdout: ForecastGrid,
    pub model: FittedModel,
}

/// Write a model artifact JSON file.
pub fn write_model_json(path: &Path, artifact: &ModelFile) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new(
                    2,
                    format!("Failed to create artifact dir '{}': {e}", parent.display()),
                )
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model artifact JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display()))
    })?;
    let artifact: ModelFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DirectionEncoding, ModelKind, SpeedEncoding, TimeEncoding};
    use crate::models::LinearModel;
    use chrono::TimeZone;

    #[test]
    fn artifact_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "windcast_artifact_test_{}.json",
            std::process::id()
        ));

        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let artifact = ModelFile {
            tool: "windcast".to_string(),
            created: t0,
            experiment: "unit-test".to_string(),
            days: 90,
            spec: PipelineSpec {
                time: TimeEncoding::Drop,
                speed: SpeedEncoding::Raw,
                direction: DirectionEncoding::Drop,
                model: ModelKind::Linear,
            },
            cv_mape: 0.12,
            metrics: HoldoutMetrics {
                test_mse: 4.0,
                test_rmse: 2.0,
                test_mape: 0.1,
            },
            holdout: ForecastGrid {
                timestamps: vec![t0],
                observed: vec![100.0],
                predicted: vec![98.0],
            },
            model: FittedModel::Linear(LinearModel {
                betas: vec![1.0, 2.0],
            }),
        };

        write_model_json(&path, &artifact).unwrap();
        let back = read_model_json(&path).unwrap();

        assert_eq!(back.spec, artifact.spec);
        assert_eq!(back.holdout.observed, artifact.holdout.observed);
        assert!((back.metrics.test_mse - 4.0).abs() < 1e-12);
        match back.model {
            FittedModel::Linear(m) => assert_eq!(m.betas, vec![1.0, 2.0]),
            other => panic!("unexpected model kind: {:?}", other.kind()),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_model_json(Path::new("/nonexistent/model.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
