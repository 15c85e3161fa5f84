//! Pipeline grid enumeration.
//!
//! Why exhaustive grid search?
//! - It avoids the local-minima and reproducibility issues of randomized
//!   tuners.
//! - It is deterministic given the same flags, so runs logged to the tracking
//!   backend can be compared meaningfully.
//! - The grid is small (dozens to a few hundred candidates), so exhaustive
//!   evaluation is fast enough for a one-shot experiment.

use crate::domain::{DirectionEncoding, PipelineSpec, SearchConfig, SpeedEncoding, TimeEncoding};

/// Enumerate every candidate pipeline in a fixed, deterministic order.
pub fn build_grid(config: &SearchConfig) -> Vec<PipelineSpec> {
    let models = config.model_filter.kinds();

    let mut out =
        Vec::with_capacity(TimeEncoding::ALL.len() * SpeedEncoding::ALL.len() * DirectionEncoding::ALL.len() * models.len());
    for &time in &TimeEncoding::ALL {
        for &speed in &SpeedEncoding::ALL {
            for &direction in &DirectionEncoding::ALL {
                for &model in &models {
                    out.push(PipelineSpec {
                        time,
                        speed,
                        direction,
                        model,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelFilter, ModelKind, TrackingServer};
    use std::collections::HashSet;

    fn config(filter: ModelFilter) -> SearchConfig {
        SearchConfig {
            tracking_server: TrackingServer::Local,
            experiment: "test".to_string(),
            days: 7,
            offline: true,
            sample_count: 64,
            seed: 42,
            folds: 3,
            test_fraction: 0.2,
            model_filter: filter,
            poly_degree: 2,
            wavelet_level: 2,
            knn_k: 5,
            huber_delta: 1.35,
            huber_iters: 20,
            ransac_trials: 50,
            ransac_min_fraction: 0.1,
            gp_length_scale: 1.0,
            gp_noise: 0.1,
            gp_max_points: 256,
            mlp_hidden: 8,
            mlp_epochs: 50,
            mlp_learning_rate: 0.01,
            top_n: 10,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_model: None,
        }
    }

    #[test]
    fn full_grid_has_expected_cardinality() {
        // 3 time x 4 speed x 3 direction x 6 models.
        let grid = build_grid(&config(ModelFilter::All));
        assert_eq!(grid.len(), 216);

        let unique: HashSet<_> = grid.iter().copied().collect();
        assert_eq!(unique.len(), grid.len());
    }

    #[test]
    fn model_filter_restricts_the_grid() {
        let grid = build_grid(&config(ModelFilter::Gp));
        assert_eq!(grid.len(), 36);
        assert!(grid.iter().all(|s| s.model == ModelKind::Gp));
    }

    #[test]
    fn enumeration_order_is_deterministic() {
        let a = build_grid(&config(ModelFilter::All));
        let b = build_grid(&config(ModelFilter::All));
        assert_eq!(a, b);
        // First candidate is the all-default corner of the grid.
        assert_eq!(a[0].time, TimeEncoding::Drop);
        assert_eq!(a[0].speed, SpeedEncoding::Raw);
        assert_eq!(a[0].direction, DirectionEncoding::Drop);
        assert_eq!(a[0].model, ModelKind::Linear);
    }
}
