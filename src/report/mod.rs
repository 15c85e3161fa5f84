//! Reporting utilities: run summary and leaderboard formatting.
//!
//! We keep formatting code in one place so:
//! - the search/metric code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DatasetStats, HoldoutMetrics, SearchConfig};
use crate::search::{CandidateResult, SearchSelection};

/// Format the full run summary (dataset stats + search diagnostics + chosen
/// pipeline + holdout metrics).
pub fn format_run_summary(
    stats: &DatasetStats,
    n_train: usize,
    n_test: usize,
    selection: &SearchSelection,
    metrics: &HoldoutMetrics,
    config: &SearchConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== windcast - pipeline grid search ===\n");
    out.push_str(&format!(
        "Tracking: {} | experiment: {}\n",
        config.tracking_server.display_name(),
        config.experiment
    ));
    out.push_str(&format!(
        "Data: n={} | {} .. {}\n",
        stats.n_obs,
        stats.time_min.format("%Y-%m-%d %H:%M"),
        stats.time_max.format("%Y-%m-%d %H:%M"),
    ));
    out.push_str(&format!(
        "Speed: [{:.2}, {:.2}] m/s | Power: [{:.1}, {:.1}] kW\n",
        stats.speed_min, stats.speed_max, stats.power_min, stats.power_max
    ));
    out.push_str(&format!(
        "Split: train={n_train} test={n_test} | folds={}\n",
        config.folds
    ));

    out.push_str("\nSearch diagnostics:\n");
    out.push_str(&format!(
        "- grid: {} candidates ({} skipped)\n",
        selection.grid_size,
        selection.skipped.len()
    ));
    for (spec, reason) in selection.skipped.iter().take(5) {
        out.push_str(&format!("  (skipped {}) {reason}\n", spec.label()));
    }
    if selection.skipped.len() > 5 {
        out.push_str(&format!("  ... and {} more\n", selection.skipped.len() - 5));
    }

    out.push_str("\nChosen pipeline:\n");
    out.push_str(&format!("- {}\n", selection.best.spec.label()));
    out.push_str(&format!(
        "- cv_mape: {:.4} (folds: {})\n",
        selection.best.cv_mape,
        fmt_vec(&selection.best.fold_mape)
    ));

    out.push_str("\nHoldout metrics:\n");
    out.push_str(&format!("- test_mse : {:.3}\n", metrics.test_mse));
    out.push_str(&format!("- test_rmse: {:.3}\n", metrics.test_rmse));
    out.push_str(&format!("- test_mape: {:.4}\n", metrics.test_mape));
    out.push('\n');

    out
}

/// Format the top-N leaderboard table.
pub fn format_leaderboard(leaderboard: &[CandidateResult], top_n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("Top {} pipelines by CV MAPE:\n", top_n.min(leaderboard.len())));
    out.push_str(
        format!(
            "{:<5} {:<40} {:>10} {:>10} {:>10}\n",
            "rank", "pipeline", "cv_mape", "best_fold", "worst_fold"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<5} {:-<40} {:-<10} {:-<10} {:-<10}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (rank, candidate) in leaderboard.iter().take(top_n).enumerate() {
        let best_fold = candidate
            .fold_mape
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        let worst_fold = candidate
            .fold_mape
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        out.push_str(
            format!(
                "{:<5} {:<40} {:>10.4} {:>10.4} {:>10.4}\n",
                rank + 1,
                truncate(&candidate.spec.label(), 40),
                candidate.cv_mape,
                best_fold,
                worst_fold,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DirectionEncoding, ModelKind, PipelineSpec, SpeedEncoding, TimeEncoding,
    };

    fn candidate(idx: usize, cv: f64) -> CandidateResult {
        CandidateResult {
            idx,
            spec: PipelineSpec {
                time: TimeEncoding::Raw,
                speed: SpeedEncoding::Standardized,
                direction: DirectionEncoding::Drop,
                model: ModelKind::Linear,
            },
            cv_mape: cv,
            fold_mape: vec![cv - 0.01, cv + 0.01],
        }
    }

    #[test]
    fn leaderboard_lists_top_n_rows() {
        let board = vec![candidate(0, 0.1), candidate(1, 0.2), candidate(2, 0.3)];
        let txt = format_leaderboard(&board, 2);
        assert!(txt.contains("Top 2 pipelines"));
        assert!(txt.contains("raw|standardized|drop|linear"));
        // Header + separator + 2 rows.
        assert_eq!(txt.lines().count(), 5);
    }

    #[test]
    fn truncate_appends_a_dot_when_cutting() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd.");
    }
}
