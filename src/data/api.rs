//! Measurement-service integration.
//!
//! The service exposes the farm's SCADA history as JSON:
//!
//! `GET {base}/observations?days=N` →
//! `{"observations": [{"time": ..., "speed": ..., "direction": "NNE", "total": ...}, ...]}`
//!
//! Rows with missing or unparsable fields are skipped and counted rather than
//! failing the whole pull; sensors drop readings all the time.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::domain::Observation;
use crate::error::AppError;
use crate::features::compass_to_degrees;

/// Fetch result: clean, time-sorted observations plus the skip count.
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub observations: Vec<Observation>,
    pub rows_skipped: usize,
}

pub struct WindClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl WindClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("WINDCAST_API_URL")
            .map_err(|_| AppError::new(2, "Missing WINDCAST_API_URL in environment (.env)."))?;
        let token = std::env::var("WINDCAST_API_TOKEN").ok();
        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    pub fn fetch_observations(&self, days: u32) -> Result<FetchedSeries, AppError> {
        if days == 0 {
            return Err(AppError::new(2, "Data window must be at least 1 day."));
        }

        let url = format!("{}/observations", self.base_url.trim_end_matches('/'));
        let mut req = self
            .client
            .get(&url)
            .query(&[("days", days.to_string())]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("Measurement request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Measurement request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse measurement response: {e}")))?;

        let mut observations = Vec::with_capacity(body.observations.len());
        let mut rows_skipped = 0usize;
        for row in &body.observations {
            match parse_row(row) {
                Some(obs) => observations.push(obs),
                None => rows_skipped += 1,
            }
        }

        if observations.is_empty() {
            return Err(AppError::new(
                3,
                format!("No valid observations in the last {days} days."),
            ));
        }

        observations.sort_by_key(|o| o.timestamp);

        if rows_skipped > 0 {
            info!("skipped {rows_skipped} invalid measurement rows");
        }

        Ok(FetchedSeries {
            observations,
            rows_skipped,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<WireRow>,
}

#[derive(Debug, Deserialize)]
struct WireRow {
    time: String,
    speed: Option<f64>,
    direction: Option<String>,
    total: Option<f64>,
}

fn parse_row(row: &WireRow) -> Option<Observation> {
    let timestamp = parse_timestamp(&row.time)?;
    let speed = row.speed.filter(|v| v.is_finite() && *v >= 0.0)?;
    let power = row.total.filter(|v| v.is_finite())?;
    let direction = row.direction.as_deref()?.trim().to_ascii_uppercase();
    compass_to_degrees(&direction)?;

    Some(Observation {
        timestamp,
        speed,
        direction,
        power,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    // Some exports drop the timezone suffix; treat those as UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: &str, speed: Option<f64>, direction: Option<&str>, total: Option<f64>) -> WireRow {
        WireRow {
            time: time.to_string(),
            speed,
            direction: direction.map(str::to_string),
            total,
        }
    }

    #[test]
    fn valid_rows_parse_and_normalize_direction() {
        let obs = parse_row(&row(
            "2024-05-01T12:30:00Z",
            Some(8.5),
            Some(" nne "),
            Some(412.0),
        ))
        .unwrap();
        assert_eq!(obs.direction, "NNE");
        assert!((obs.speed - 8.5).abs() < 1e-12);
        assert!((obs.power - 412.0).abs() < 1e-12);
    }

    #[test]
    fn bad_rows_are_skipped() {
        // Missing speed.
        assert!(parse_row(&row("2024-05-01T12:30:00Z", None, Some("N"), Some(1.0))).is_none());
        // Negative speed.
        assert!(parse_row(&row("2024-05-01T12:30:00Z", Some(-1.0), Some("N"), Some(1.0))).is_none());
        // Unknown compass label.
        assert!(parse_row(&row("2024-05-01T12:30:00Z", Some(5.0), Some("UP"), Some(1.0))).is_none());
        // Unparsable timestamp.
        assert!(parse_row(&row("yesterday", Some(5.0), Some("N"), Some(1.0))).is_none());
        // Non-finite power.
        assert!(
            parse_row(&row("2024-05-01T12:30:00Z", Some(5.0), Some("N"), Some(f64::NAN)))
                .is_none()
        );
    }

    #[test]
    fn timestamps_parse_with_and_without_timezone() {
        assert!(parse_timestamp("2024-05-01T12:30:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T12:30:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01 12:30:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
