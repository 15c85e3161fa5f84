//! Regression metrics.
//!
//! The grid search scores candidates by MAPE (the cross-validation scorer);
//! the holdout window is additionally reported as MSE/RMSE. Wind farms produce
//! ~0 kW below cut-in speed, so MAPE denominators are floored to keep the
//! score finite on calm stretches.

use crate::error::AppError;

/// Floor applied to `|actual|` in the MAPE denominator.
const MAPE_EPS: f64 = 1e-6;

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), AppError> {
    if actual.is_empty() {
        return Err(AppError::new(3, "Cannot compute a metric over zero points."));
    }
    if actual.len() != predicted.len() {
        return Err(AppError::new(
            4,
            format!(
                "Metric length mismatch: {} actual vs {} predicted.",
                actual.len(),
                predicted.len()
            ),
        ));
    }
    Ok(())
}

/// Mean absolute percentage error (fraction, not percent).
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| (a - p).abs() / a.abs().max(MAPE_EPS))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Mean squared error.
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| (a - p) * (a - p))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    Ok(mse(actual, predicted)?.sqrt())
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    check_lengths(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_zero() {
        let y = [1.0, 2.0, 3.0];
        assert!(mape(&y, &y).unwrap().abs() < 1e-12);
        assert!(mse(&y, &y).unwrap().abs() < 1e-12);
        assert!(mae(&y, &y).unwrap().abs() < 1e-12);
    }

    #[test]
    fn mse_hand_value() {
        let a = [1.0, 2.0];
        let p = [2.0, 4.0];
        // ((1)^2 + (2)^2) / 2 = 2.5
        assert!((mse(&a, &p).unwrap() - 2.5).abs() < 1e-12);
        assert!((rmse(&a, &p).unwrap() - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn mape_hand_value() {
        let a = [10.0, 20.0];
        let p = [11.0, 18.0];
        // (0.1 + 0.1) / 2 = 0.1
        assert!((mape(&a, &p).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn mape_survives_zero_actuals() {
        let a = [0.0, 10.0];
        let p = [0.0, 10.0];
        let v = mape(&a, &p).unwrap();
        assert!(v.is_finite());
        assert!(v.abs() < 1e-12);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert!(mse(&[1.0], &[1.0, 2.0]).is_err());
        assert!(mse(&[], &[]).is_err());
    }
}
