//! Timestamp feature encodings.
//!
//! Wind production has strong daily and seasonal structure, so the calendar
//! encoding maps the timestamp onto the unit circle twice: once for the hour
//! of day and once for the day of year. Using sin/cos pairs keeps midnight
//! adjacent to 23:59 and New Year adjacent to December 31.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Cyclic calendar features: `[sin(hour), cos(hour), sin(doy), cos(doy)]`.
pub fn calendar_features(ts: &DateTime<Utc>) -> [f64; 4] {
    let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;
    let hour_angle = hour / 24.0 * std::f64::consts::TAU;

    // 365.25 keeps leap years from wrapping past the full circle.
    let doy = (ts.ordinal() - 1) as f64;
    let doy_angle = doy / 365.25 * std::f64::consts::TAU;

    [
        hour_angle.sin(),
        hour_angle.cos(),
        doy_angle.sin(),
        doy_angle.cos(),
    ]
}

/// Hours elapsed since a reference instant (the training-window start).
pub fn hours_since(ts: &DateTime<Utc>, origin: &DateTime<Utc>) -> f64 {
    (*ts - *origin).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn midnight_and_noon_are_opposite_on_the_hour_circle() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let m = calendar_features(&midnight);
        let n = calendar_features(&noon);

        // sin(0)=0, cos(0)=1; sin(pi)=0, cos(pi)=-1.
        assert!(m[0].abs() < 1e-9 && (m[1] - 1.0).abs() < 1e-9);
        assert!(n[0].abs() < 1e-9 && (n[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn day_of_year_features_are_on_the_unit_circle() {
        let ts = Utc.with_ymd_and_hms(2024, 10, 15, 8, 30, 0).unwrap();
        let f = calendar_features(&ts);
        let norm = (f[2] * f[2] + f[3] * f[3]).sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hours_since_basic() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap();
        assert!((hours_since(&t1, &t0) - 30.0).abs() < 1e-9);
        assert!((hours_since(&t0, &t0)).abs() < 1e-9);
    }
}
