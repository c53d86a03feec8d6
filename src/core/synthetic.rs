use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::core::matrix::{TraceHeader, TraceRecord};

/// Ricker wavelet with peak frequency `f_hz`, evaluated at `t` seconds.
pub fn ricker(t: f64, f_hz: f64) -> f64 {
    let a = (PI * f_hz * t).powi(2);
    (1.0 - 2.0 * a) * (-a).exp()
}

/// Section with three dipping reflectors and a little seeded noise.
///
/// Ensemble numbers start at 1001 so they are distinguishable from trace
/// indices in plots.
pub fn ricker_section(
    n_traces: usize,
    n_samples: usize,
    sample_interval_us: f64,
    seed: u64,
) -> Vec<TraceRecord> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let dt = sample_interval_us / 1e6;
    let duration = n_samples as f64 * dt;
    let reflectors = [(0.2, 0.05, 1.0), (0.45, -0.1, -0.7), (0.7, 0.02, 0.5)];

    (0..n_traces)
        .map(|j| {
            let x = j as f64 / n_traces.max(1) as f64;
            let samples = (0..n_samples)
                .map(|i| {
                    let t = i as f64 * dt;
                    let signal: f64 = reflectors
                        .iter()
                        .map(|&(t0, dip, amp)| amp * ricker(t - (t0 + dip * x) * duration, 25.0))
                        .sum();
                    let noise: f64 = rng.random_range(-0.02..0.02);
                    (signal + noise) as f32
                })
                .collect();
            TraceRecord::new(
                TraceHeader {
                    sample_count: n_samples,
                    sample_interval_us,
                    elevation: 0,
                    source_point_id: j as i32 / 2 + 1,
                    ensemble_number: 1001 + j as i32,
                    sequence_number: j as i32 + 1,
                },
                samples,
            )
        })
        .collect()
}
