//! Chronological train/test split and dataset stats.
//!
//! The series is fetched once and split once: the most recent
//! `test_fraction` of rows becomes the holdout window and never touches the
//! cross-validation loop.

use crate::domain::{DatasetStats, Observation};
use crate::error::AppError;

pub fn chronological_split(
    observations: &[Observation],
    test_fraction: f64,
) -> Result<(Vec<Observation>, Vec<Observation>), AppError> {
    if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AppError::new(2, "Test fraction must be in (0, 1)."));
    }

    let n = observations.len();
    let n_test = ((n as f64 * test_fraction).round() as usize).max(1);
    if n_test >= n {
        return Err(AppError::new(
            3,
            format!("Not enough observations to split: n={n}, test={n_test}."),
        ));
    }
    let n_train = n - n_test;
    if n_train < 4 {
        return Err(AppError::new(
            3,
            format!("Training window too small after split: n_train={n_train}."),
        ));
    }

    Ok((
        observations[..n_train].to_vec(),
        observations[n_train..].to_vec(),
    ))
}

pub fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    let first = observations.first()?;
    let mut stats = DatasetStats {
        n_obs: observations.len(),
        time_min: first.timestamp,
        time_max: first.timestamp,
        speed_min: f64::INFINITY,
        speed_max: f64::NEG_INFINITY,
        power_min: f64::INFINITY,
        power_max: f64::NEG_INFINITY,
    };

    for obs in observations {
        stats.time_min = stats.time_min.min(obs.timestamp);
        stats.time_max = stats.time_max.max(obs.timestamp);
        stats.speed_min = stats.speed_min.min(obs.speed);
        stats.speed_max = stats.speed_max.max(obs.speed);
        stats.power_min = stats.power_min.min(obs.power);
        stats.power_max = stats.power_max.max(obs.power);
    }

    if !stats.speed_min.is_finite()
        || !stats.speed_max.is_finite()
        || !stats.power_min.is_finite()
        || !stats.power_max.is_finite()
    {
        return None;
    }

    Some(stats)
}
