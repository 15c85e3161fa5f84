//! Scaling and polynomial expansion for the speed column.

use crate::error::AppError;
use crate::math::{mean, std_dev};

/// Standardizer fitted on the training window only.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: f64,
    std: f64,
}

impl StandardScaler {
    /// Fit mean/std on training values.
    ///
    /// The std is floored so a constant column transforms to zeros instead of
    /// dividing by zero.
    pub fn fit(values: &[f64]) -> Result<Self, AppError> {
        if values.len() < 2 {
            return Err(AppError::new(
                3,
                "Need at least 2 observations to fit a scaler.",
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::new(4, "Non-finite value while fitting scaler."));
        }
        let m = mean(values).unwrap_or(0.0);
        let s = std_dev(values).unwrap_or(0.0).max(1e-9);
        Ok(Self { mean: m, std: s })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Polynomial powers `value^1 ..= value^degree` (no bias column; the models
/// supply their own intercept).
pub fn polynomial_row(value: f64, degree: usize) -> Vec<f64> {
    let degree = degree.max(1);
    let mut out = Vec::with_capacity(degree);
    let mut acc = 1.0;
    for _ in 0..degree {
        acc *= value;
        out.push(acc);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaler_standardizes_training_values() {
        let values = [2.0, 4.0, 6.0];
        let scaler = StandardScaler::fit(&values).unwrap();

        let transformed: Vec<f64> = values.iter().map(|&v| scaler.transform(v)).collect();
        let m = mean(&transformed).unwrap();
        let s = std_dev(&transformed).unwrap();
        assert!(m.abs() < 1e-12);
        assert!((s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scaler_handles_constant_column() {
        let scaler = StandardScaler::fit(&[3.0, 3.0, 3.0]).unwrap();
        assert!(scaler.transform(3.0).abs() < 1e-6);
    }

    #[test]
    fn scaler_rejects_tiny_or_bad_input() {
        assert!(StandardScaler::fit(&[1.0]).is_err());
        assert!(StandardScaler::fit(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn polynomial_row_powers() {
        assert_eq!(polynomial_row(2.0, 3), vec![2.0, 4.0, 8.0]);
        // Degree is floored at 1.
        assert_eq!(polynomial_row(5.0, 0), vec![5.0]);
    }
}
