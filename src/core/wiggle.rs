//! Wiggle-trace paths: each displayed trace becomes a polyline offset to its
//! display position plus a region filled back to that baseline.

use crate::core::matrix::{AmplitudeMatrix, TimeBase};
use crate::error::{Error, Result};
use std::num::NonZeroUsize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WiggleParams {
    /// Display every `skip`-th trace.
    pub skip: NonZeroUsize,
    pub gain: f64,
}

impl Default for WiggleParams {
    fn default() -> Self {
        Self {
            skip: NonZeroUsize::MIN,
            gain: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WigglePath {
    /// Position among displayed traces; also the baseline x.
    pub display_index: usize,
    /// Column in the amplitude grid.
    pub trace_index: usize,
    /// `(x, t_ms)` per sample.
    pub points: Vec<(f64, f64)>,
}

impl WigglePath {
    pub fn baseline(&self) -> f64 {
        self.display_index as f64
    }

    /// Closed outline between the trace and its baseline: the trace top to
    /// bottom, then the baseline bottom to top.
    pub fn fill_polygon(&self) -> Vec<(f64, f64)> {
        let x0 = self.baseline();
        let mut poly = Vec::with_capacity(self.points.len() * 2);
        poly.extend_from_slice(&self.points);
        poly.extend(self.points.iter().rev().map(|&(_, t)| (x0, t)));
        poly
    }
}

/// Builds one path per displayed trace.
///
/// `x = gain * sample / clip_val + display_index`; display indices are
/// consecutive regardless of `skip`.
pub fn build(
    matrix: &AmplitudeMatrix,
    timebase: &TimeBase,
    clip_val: f64,
    params: WiggleParams,
) -> Result<Vec<WigglePath>> {
    if !(clip_val > 0.0 && clip_val.is_finite()) {
        return Err(Error::ZeroNormalization { clip_val });
    }
    debug_assert_eq!(timebase.len(), matrix.n_samples());

    let scale = params.gain / clip_val;
    let paths = matrix
        .columns()
        .enumerate()
        .step_by(params.skip.get())
        .enumerate()
        .map(|(display_index, (trace_index, samples))| {
            let x0 = display_index as f64;
            let points = samples
                .iter()
                .zip(timebase.times_ms())
                .map(|(&a, &t)| (scale * a as f64 + x0, t))
                .collect();
            WigglePath {
                display_index,
                trace_index,
                points,
            }
        })
        .collect();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n_samples: usize, n_traces: usize) -> (AmplitudeMatrix, TimeBase) {
        let data = (0..n_samples * n_traces).map(|i| i as f32).collect();
        (
            AmplitudeMatrix::from_columns(n_samples, n_traces, data),
            TimeBase::new(n_samples, 2000.0),
        )
    }

    fn skip(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn stride_uses_display_positions() {
        let (m, tb) = ramp(3, 10);
        let paths = build(
            &m,
            &tb,
            1.0,
            WiggleParams {
                skip: skip(2),
                gain: 0.0,
            },
        )
        .unwrap();
        assert_eq!(paths.len(), 5);
        let baselines: Vec<f64> = paths.iter().map(|p| p.points[0].0).collect();
        assert_eq!(baselines, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let columns: Vec<usize> = paths.iter().map(|p| p.trace_index).collect();
        assert_eq!(columns, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn amplitudes_are_scaled_by_gain_over_clip() {
        let (m, tb) = ramp(2, 2);
        let paths = build(
            &m,
            &tb,
            4.0,
            WiggleParams {
                skip: skip(1),
                gain: 2.0,
            },
        )
        .unwrap();
        // trace 1 holds samples 2.0 and 3.0
        assert_relative_eq!(paths[1].points[0].0, 1.0 + 2.0 * 2.0 / 4.0);
        assert_relative_eq!(paths[1].points[1].0, 1.0 + 2.0 * 3.0 / 4.0);
        assert_eq!(paths[1].points[1].1, 2.0);
    }

    #[test]
    fn fill_closes_on_baseline() {
        let (m, tb) = ramp(3, 2);
        let paths = build(&m, &tb, 10.0, WiggleParams::default()).unwrap();
        let poly = paths[1].fill_polygon();
        assert_eq!(poly.len(), 6);
        assert_eq!(&poly[..3], paths[1].points.as_slice());
        assert_eq!(poly[3], (1.0, 4.0));
        assert_eq!(poly[5], (1.0, 0.0));
    }

    #[test]
    fn zero_clip_is_rejected() {
        let (m, tb) = ramp(3, 2);
        for clip in [0.0, -1.0, f64::NAN] {
            let err = build(&m, &tb, clip, WiggleParams::default()).unwrap_err();
            assert!(matches!(err, Error::ZeroNormalization { .. }));
        }
    }
}
