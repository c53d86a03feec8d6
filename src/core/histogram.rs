//! Amplitude histogram whose bin width tracks the clip value.
//!
//! Bins span the full data range, but roughly 100 of them fall inside the
//! displayed `(-clip, clip)` window whatever the outliers look like.

use crate::core::matrix::AmplitudeMatrix;
use crate::core::stats::{MIN_CLIP, Statistics};
use crate::error::{Error, Result};

pub const MAX_BINS: usize = 10_000;

/// Bins expected inside the clip window.
const BINS_PER_CLIP: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramSpec {
    pub bin_count: usize,
    /// Displayed amplitude window.
    pub range: (f64, f64),
    /// Extent the bins are laid over.
    pub data_range: (f64, f64),
}

impl HistogramSpec {
    /// Bin edges over the data range, `bin_count + 1` values.
    pub fn edges(&self) -> Vec<f64> {
        let (lo, hi) = self.bin_span();
        let width = (hi - lo) / self.bin_count as f64;
        (0..=self.bin_count)
            .map(|i| lo + i as f64 * width)
            .collect()
    }

    /// Equal-width counts over the data range; the last bin is closed.
    pub fn counts(&self, matrix: &AmplitudeMatrix) -> Vec<u64> {
        let (lo, hi) = self.bin_span();
        let width = (hi - lo) / self.bin_count as f64;
        let mut counts = vec![0u64; self.bin_count];
        for &v in matrix.values() {
            let v = v as f64;
            if !v.is_finite() || v < lo || v > hi {
                continue;
            }
            let idx = (((v - lo) / width) as usize).min(self.bin_count - 1);
            counts[idx] += 1;
        }
        counts
    }

    fn bin_span(&self) -> (f64, f64) {
        let (lo, hi) = self.data_range;
        if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) }
    }
}

/// Sizes the histogram so that `bin_count = round(100 * largest / clip_val)`.
pub fn compute(matrix: &AmplitudeMatrix, clip_val: f64) -> Result<HistogramSpec> {
    let (min, max) = matrix
        .values()
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v as f64), hi.max(v as f64))
        });
    sized((min, max), max.abs().max(min.abs()), clip_val)
}

/// [`compute`] from statistics already gathered, without another pass over
/// the samples.
pub fn from_statistics(stats: &Statistics) -> Result<HistogramSpec> {
    sized((stats.min, stats.max), stats.largest(), stats.clip_val)
}

fn sized(data_range: (f64, f64), largest: f64, clip_val: f64) -> Result<HistogramSpec> {
    if !(largest > 0.0 && largest.is_finite()) {
        return Err(Error::DegenerateHistogram {
            largest: if largest.is_finite() { largest } else { 0.0 },
        });
    }

    let clip = if clip_val > MIN_CLIP { clip_val } else { MIN_CLIP };
    let bins = (BINS_PER_CLIP / (clip / largest)).round();
    let bin_count = if bins.is_finite() {
        (bins as usize).clamp(1, MAX_BINS)
    } else {
        MAX_BINS
    };

    Ok(HistogramSpec {
        bin_count,
        range: (-clip, clip),
        data_range,
    })
}
