//! Small statistics helpers shared by the robust fitters and the scalers.

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator); `None` below 2 values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(var.sqrt())
}

/// Median of a mutable slice (sorts in place).
pub fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Median absolute deviation about the median.
pub fn mad(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let med = median_mut(&mut sorted)?;
    let mut abs_dev: Vec<f64> = sorted.iter().map(|v| (v - med).abs()).collect();
    median_mut(&mut abs_dev)
}

/// Robust scale estimate from residuals: `MAD / 0.6745`, floored away from zero.
///
/// The 0.6745 constant makes MAD consistent with the standard deviation under
/// normal residuals.
pub fn robust_scale(residuals: &[f64]) -> f64 {
    let mut abs: Vec<f64> = residuals
        .iter()
        .map(|r| r.abs())
        .filter(|v| v.is_finite())
        .collect();
    let m = median_mut(&mut abs).unwrap_or(0.0);
    (m / 0.6745).max(1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_basic() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&v).unwrap() - 2.5).abs() < 1e-12);
        // Sample variance of [1,2,3,4] is 5/3.
        assert!((std_dev(&v).unwrap() - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn median_handles_even_and_odd() {
        let mut odd = [3.0, 1.0, 2.0];
        assert!((median_mut(&mut odd).unwrap() - 2.0).abs() < 1e-12);
        let mut even = [4.0, 1.0, 3.0, 2.0];
        assert!((median_mut(&mut even).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn mad_of_constant_series_is_zero() {
        let v = [5.0, 5.0, 5.0];
        assert!((mad(&v).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn robust_scale_is_floored() {
        assert!(robust_scale(&[0.0, 0.0, 0.0]) >= 1e-12);
    }
}
