//! Expanding-window cross-validation folds.
//!
//! Follows `TimeSeriesSplit` semantics: with `k` folds over `n` ordered rows,
//! each validation block has `n / (k + 1)` rows and the training window is
//! everything strictly before it. Validation rows are never earlier than any
//! training row, so no fold looks into the future.

use crate::error::AppError;

/// One fold: `[0, train_end)` trains, `[val_start, val_end)` validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fold {
    pub train_end: usize,
    pub val_start: usize,
    pub val_end: usize,
}

pub fn time_series_folds(n: usize, n_folds: usize) -> Result<Vec<Fold>, AppError> {
    if n_folds < 2 {
        return Err(AppError::new(2, "Cross-validation needs at least 2 folds."));
    }

    let val_size = n / (n_folds + 1);
    if val_size == 0 {
        return Err(AppError::new(
            3,
            format!("Not enough observations ({n}) for {n_folds} folds."),
        ));
    }

    // The first training window absorbs the remainder, mirroring the usual
    // TimeSeriesSplit layout.
    let first_train = n - n_folds * val_size;
    if first_train < 2 {
        return Err(AppError::new(
            3,
            format!("First training window too small: {first_train} rows."),
        ));
    }

    let mut folds = Vec::with_capacity(n_folds);
    for i in 0..n_folds {
        let train_end = first_train + i * val_size;
        folds.push(Fold {
            train_end,
            val_start: train_end,
            val_end: train_end + val_size,
        });
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_follow_time_series_split_layout() {
        // n=120, k=5 -> val blocks of 20, first train of 20.
        let folds = time_series_folds(120, 5).unwrap();
        assert_eq!(folds.len(), 5);
        assert_eq!(
            folds[0],
            Fold {
                train_end: 20,
                val_start: 20,
                val_end: 40
            }
        );
        assert_eq!(folds[4].val_end, 120);

        for fold in &folds {
            assert_eq!(fold.train_end, fold.val_start);
            assert!(fold.val_end > fold.val_start);
        }
    }

    #[test]
    fn remainder_goes_to_the_first_training_window() {
        // n=23, k=3 -> val=5, first train = 23 - 15 = 8.
        let folds = time_series_folds(23, 3).unwrap();
        assert_eq!(folds[0].train_end, 8);
        assert_eq!(folds[2].val_end, 23);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(time_series_folds(100, 1).is_err());
        assert!(time_series_folds(3, 5).is_err());
        assert!(time_series_folds(0, 2).is_err());
    }
}
