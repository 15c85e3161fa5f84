//! Export the search leaderboard to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts comparing runs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::search::CandidateResult;

/// Write the full leaderboard (one row per surviving candidate).
pub fn write_leaderboard_csv(path: &Path, leaderboard: &[CandidateResult]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "rank,time,speed,direction,model,cv_mape,fold_mape"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (rank, candidate) in leaderboard.iter().enumerate() {
        let folds = candidate
            .fold_mape
            .iter()
            .map(|v| format!("{v:.6}"))
            .collect::<Vec<_>>()
            .join(";");
        writeln!(
            file,
            "{},{},{},{},{},{:.6},{}",
            rank + 1,
            candidate.spec.time.display_name(),
            candidate.spec.speed.display_name(),
            candidate.spec.direction.display_name(),
            candidate.spec.model.display_name(),
            candidate.cv_mape,
            folds,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DirectionEncoding, ModelKind, PipelineSpec, SpeedEncoding, TimeEncoding,
    };

    #[test]
    fn leaderboard_csv_has_one_row_per_candidate() {
        let path = std::env::temp_dir().join(format!(
            "windcast_leaderboard_test_{}.csv",
            std::process::id()
        ));

        let leaderboard = vec![CandidateResult {
            idx: 0,
            spec: PipelineSpec {
                time: TimeEncoding::Calendar,
                speed: SpeedEncoding::Wavelet,
                direction: DirectionEncoding::Sector,
                model: ModelKind::Huber,
            },
            cv_mape: 0.25,
            fold_mape: vec![0.2, 0.3],
        }];

        write_leaderboard_csv(&path, &leaderboard).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rank,time,speed"));
        assert!(lines[1].starts_with("1,calendar,wavelet,sector,huber,0.250000,"));

        let _ = std::fs::remove_file(&path);
    }
}
