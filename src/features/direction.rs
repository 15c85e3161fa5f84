//! Wind-direction encodings.
//!
//! The measurement service reports direction as a 16-point compass label
//! (`N`, `NNE`, ..., `NNW`). The sector encoding maps labels to degrees; the
//! cartesian encoding decomposes the angle into sin/cos components so that
//! 350° and 10° end up close together.

/// 16-point compass rose, 22.5° per sector, clockwise from north.
pub const COMPASS_LABELS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Map a compass label to degrees clockwise from north.
///
/// Matching is case-insensitive and whitespace-tolerant; unknown labels
/// return `None` (callers decide whether that is a skip or an error).
pub fn compass_to_degrees(label: &str) -> Option<f64> {
    let trimmed = label.trim();
    COMPASS_LABELS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(trimmed))
        .map(|i| i as f64 * 22.5)
}

/// Decompose an angle in degrees into `(sin, cos)` components.
pub fn degrees_to_cartesian(degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    (rad.sin(), rad.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_points_map_to_expected_degrees() {
        assert_eq!(compass_to_degrees("N"), Some(0.0));
        assert_eq!(compass_to_degrees("E"), Some(90.0));
        assert_eq!(compass_to_degrees("S"), Some(180.0));
        assert_eq!(compass_to_degrees("W"), Some(270.0));
        assert_eq!(compass_to_degrees("NNW"), Some(337.5));
    }

    #[test]
    fn mapping_is_case_insensitive_and_trims() {
        assert_eq!(compass_to_degrees(" nne "), Some(22.5));
        assert_eq!(compass_to_degrees("sw"), Some(225.0));
    }

    #[test]
    fn unknown_labels_return_none() {
        assert_eq!(compass_to_degrees("NORTHISH"), None);
        assert_eq!(compass_to_degrees(""), None);
    }

    #[test]
    fn cartesian_components_are_unit_norm() {
        for label in COMPASS_LABELS {
            let (s, c) = degrees_to_cartesian(compass_to_degrees(label).unwrap());
            assert!(((s * s + c * c) - 1.0).abs() < 1e-12);
        }
        // East points along +sin.
        let (s, c) = degrees_to_cartesian(90.0);
        assert!((s - 1.0).abs() < 1e-12);
        assert!(c.abs() < 1e-12);
    }
}
