//! Candidate feature pipeline: fit on a training slice, transform any slice.
//!
//! The pipeline owns the train-derived state only:
//! - the training start time (for the raw time encoding)
//! - scaler statistics (for the standardized speed encoding)
//!
//! Everything else is a pure per-row (or per-column, for the wavelet)
//! computation, so transforming the validation slice can never leak
//! information from it back into the fit.

use chrono::{DateTime, Utc};

use crate::domain::{
    DirectionEncoding, Observation, PipelineSpec, SearchConfig, SpeedEncoding, TimeEncoding,
};
use crate::error::AppError;
use crate::features::calendar::{calendar_features, hours_since};
use crate::features::direction::{compass_to_degrees, degrees_to_cartesian};
use crate::features::scale::{polynomial_row, StandardScaler};
use crate::features::wavelet::wavelet_smooth;

#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    time: TimeEncoding,
    speed: SpeedEncoding,
    direction: DirectionEncoding,
    poly_degree: usize,
    wavelet_level: usize,

    // Train-fitted state.
    train_start: Option<DateTime<Utc>>,
    scaler: Option<StandardScaler>,
}

impl FeaturePipeline {
    pub fn new(spec: &PipelineSpec, config: &SearchConfig) -> Self {
        Self {
            time: spec.time,
            speed: spec.speed,
            direction: spec.direction,
            poly_degree: config.poly_degree.max(1),
            wavelet_level: config.wavelet_level.max(1),
            train_start: None,
            scaler: None,
        }
    }

    /// Fit train-derived state on the training slice.
    pub fn fit(&mut self, observations: &[Observation]) -> Result<(), AppError> {
        if observations.is_empty() {
            return Err(AppError::new(3, "Cannot fit a pipeline on zero observations."));
        }

        self.train_start = Some(observations[0].timestamp);

        if self.speed == SpeedEncoding::Standardized {
            let speeds: Vec<f64> = observations.iter().map(|o| o.speed).collect();
            self.scaler = Some(StandardScaler::fit(&speeds)?);
        }

        Ok(())
    }

    /// Number of design-matrix columns this pipeline produces.
    pub fn n_features(&self) -> usize {
        let time = match self.time {
            TimeEncoding::Drop => 0,
            TimeEncoding::Raw => 1,
            TimeEncoding::Calendar => 4,
        };
        let speed = match self.speed {
            SpeedEncoding::Polynomial => self.poly_degree,
            _ => 1,
        };
        let direction = match self.direction {
            DirectionEncoding::Drop => 0,
            DirectionEncoding::Sector => 1,
            DirectionEncoding::Cartesian => 2,
        };
        time + speed + direction
    }

    /// Column labels matching `transform` output, for reports and exports.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_features());
        match self.time {
            TimeEncoding::Drop => {}
            TimeEncoding::Raw => names.push("hours".to_string()),
            TimeEncoding::Calendar => {
                for n in ["hour_sin", "hour_cos", "doy_sin", "doy_cos"] {
                    names.push(n.to_string());
                }
            }
        }
        match self.speed {
            SpeedEncoding::Raw => names.push("speed".to_string()),
            SpeedEncoding::Standardized => names.push("speed_std".to_string()),
            SpeedEncoding::Polynomial => {
                for d in 1..=self.poly_degree {
                    names.push(format!("speed_pow{d}"));
                }
            }
            SpeedEncoding::Wavelet => names.push("speed_smooth".to_string()),
        }
        match self.direction {
            DirectionEncoding::Drop => {}
            DirectionEncoding::Sector => names.push("dir_deg".to_string()),
            DirectionEncoding::Cartesian => {
                names.push("dir_sin".to_string());
                names.push("dir_cos".to_string());
            }
        }
        names
    }

    /// Build the row-major design matrix for a slice of observations.
    pub fn transform(&self, observations: &[Observation]) -> Result<Vec<Vec<f64>>, AppError> {
        if observations.is_empty() {
            return Err(AppError::new(3, "Cannot transform zero observations."));
        }

        // The wavelet encoding is a column-level operation.
        let smoothed: Option<Vec<f64>> = match self.speed {
            SpeedEncoding::Wavelet => {
                let speeds: Vec<f64> = observations.iter().map(|o| o.speed).collect();
                Some(wavelet_smooth(&speeds, self.wavelet_level))
            }
            _ => None,
        };

        let mut rows = Vec::with_capacity(observations.len());
        for (i, obs) in observations.iter().enumerate() {
            let mut row = Vec::with_capacity(self.n_features());

            match self.time {
                TimeEncoding::Drop => {}
                TimeEncoding::Raw => {
                    let origin = self.train_start.ok_or_else(|| {
                        AppError::new(4, "Pipeline used before fit (no train start).")
                    })?;
                    row.push(hours_since(&obs.timestamp, &origin));
                }
                TimeEncoding::Calendar => row.extend(calendar_features(&obs.timestamp)),
            }

            match self.speed {
                SpeedEncoding::Raw => row.push(obs.speed),
                SpeedEncoding::Standardized => {
                    let scaler = self.scaler.as_ref().ok_or_else(|| {
                        AppError::new(4, "Pipeline used before fit (no scaler).")
                    })?;
                    row.push(scaler.transform(obs.speed));
                }
                SpeedEncoding::Polynomial => row.extend(polynomial_row(obs.speed, self.poly_degree)),
                SpeedEncoding::Wavelet => {
                    // Same length as the input by construction.
                    row.push(smoothed.as_ref().expect("smoothed column present")[i]);
                }
            }

            match self.direction {
                DirectionEncoding::Drop => {}
                DirectionEncoding::Sector | DirectionEncoding::Cartesian => {
                    let deg = compass_to_degrees(&obs.direction).ok_or_else(|| {
                        AppError::new(
                            4,
                            format!("Unknown compass label '{}' in observations.", obs.direction),
                        )
                    })?;
                    if self.direction == DirectionEncoding::Sector {
                        row.push(deg);
                    } else {
                        let (s, c) = degrees_to_cartesian(deg);
                        row.push(s);
                        row.push(c);
                    }
                }
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

/// Target column: total generated power.
pub fn targets(observations: &[Observation]) -> Vec<f64> {
    observations.iter().map(|o| o.power).collect()
}
