//! Global amplitude statistics and the percentile clip value.

use crate::core::matrix::AmplitudeMatrix;
use crate::error::{Error, Result};

/// Smallest clip value handed to normalizing consumers.
pub const MIN_CLIP: f64 = 1e-12;

pub const DEFAULT_PERCENTILE: f64 = 99.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    /// `percentile` of |amplitude| over the whole grid. May be zero.
    pub clip_val: f64,
    pub percentile: f64,
}

impl Statistics {
    /// Clip value safe to divide by.
    pub fn normalization(&self) -> f64 {
        if self.clip_val > MIN_CLIP {
            self.clip_val
        } else {
            MIN_CLIP
        }
    }

    pub fn largest(&self) -> f64 {
        self.max.abs().max(self.min.abs())
    }
}

/// Min, max and clip value of `matrix`. Non-finite samples are ignored.
pub fn estimate(matrix: &AmplitudeMatrix, percentile: f64) -> Result<Statistics> {
    if !(percentile > 0.0 && percentile <= 100.0) {
        return Err(Error::InvalidPercentile { percentile });
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut magnitudes: Vec<f64> = Vec::with_capacity(matrix.values().len());
    for &v in matrix.values() {
        if !v.is_finite() {
            continue;
        }
        let v = v as f64;
        min = min.min(v);
        max = max.max(v);
        magnitudes.push(v.abs());
    }

    if magnitudes.is_empty() {
        return Ok(Statistics {
            min: 0.0,
            max: 0.0,
            clip_val: 0.0,
            percentile,
        });
    }

    Ok(Statistics {
        min,
        max,
        clip_val: percentile_linear(&mut magnitudes, percentile),
        percentile,
    })
}

/// Percentile with linear interpolation between closest ranks.
/// Reorders `values`; `values` must be non-empty.
pub(crate) fn percentile_linear(values: &mut [f64], percentile: f64) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let last = values.len() - 1;
    let rank = percentile / 100.0 * last as f64;
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(last);
    let frac = rank - lo as f64;
    if frac == 0.0 || lo == hi {
        values[lo]
    } else {
        values[lo] + (values[hi] - values[lo]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(values: Vec<f32>, n_samples: usize) -> AmplitudeMatrix {
        let n_traces = values.len() / n_samples;
        AmplitudeMatrix::from_columns(n_samples, n_traces, values)
    }

    #[test]
    fn percentile_100_is_max_magnitude() {
        let m = grid(vec![1.0, -7.5, 3.0, 2.0], 2);
        let s = estimate(&m, 100.0).unwrap();
        assert_eq!(s.clip_val, 7.5);
        assert_eq!(s.min, -7.5);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.largest(), 7.5);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let mut v: Vec<f64> = (1..=5).map(f64::from).collect();
        assert_relative_eq!(percentile_linear(&mut v, 50.0), 3.0);
        assert_relative_eq!(percentile_linear(&mut v, 90.0), 4.6, epsilon = 1e-12);
        assert_relative_eq!(percentile_linear(&mut v, 1.0), 1.04, epsilon = 1e-12);
    }

    #[test]
    fn estimate_is_idempotent() {
        let m = grid((0..64).map(|i| ((i * 37) % 23) as f32 - 11.0).collect(), 8);
        let a = estimate(&m, 99.0).unwrap();
        let b = estimate(&m, 99.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn all_zero_grid_has_zero_clip_but_safe_normalization() {
        let m = grid(vec![0.0; 12], 3);
        let s = estimate(&m, 99.0).unwrap();
        assert_eq!(s.clip_val, 0.0);
        assert!(s.normalization() > 0.0);
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let m = grid(vec![f32::NAN, 2.0, f32::INFINITY, -4.0], 2);
        let s = estimate(&m, 100.0).unwrap();
        assert_eq!(s.min, -4.0);
        assert_eq!(s.max, 2.0);
        assert_eq!(s.clip_val, 4.0);
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        let m = grid(vec![1.0; 4], 2);
        for p in [0.0, -1.0, 100.5, f64::NAN] {
            assert!(matches!(
                estimate(&m, p),
                Err(Error::InvalidPercentile { .. })
            ));
        }
    }
}
