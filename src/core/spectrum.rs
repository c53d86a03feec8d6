//! Log-magnitude spectrum of a representative trace.
//!
//! Only the lowest quarter of the DFT bins is returned: those are all
//! positive frequencies up to half Nyquist, where reflection energy lives.

use rustfft::{FftPlanner, num_complex::Complex64};

use crate::core::matrix::AmplitudeMatrix;
use crate::error::{Error, Result};

/// Default magnitude floor applied before the logarithm.
pub const EPS_MAGNITUDE: f64 = 1e-20;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectrumSeries {
    pub freq_hz: Vec<f64>,
    pub log_power: Vec<f64>,
}

impl SpectrumSeries {
    pub fn len(&self) -> usize {
        self.freq_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq_hz.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.freq_hz
            .iter()
            .copied()
            .zip(self.log_power.iter().copied())
            .collect()
    }

    /// Frequency of the strongest displayed bin.
    pub fn peak_hz(&self) -> Option<f64> {
        self.log_power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| self.freq_hz[i])
    }
}

/// Which traces feed the estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpectrumSource {
    Trace(usize),
    Mean,
}

/// DFT sample frequencies, numpy `fftfreq` ordering: `0, 1, ..., -2, -1`
/// over `n * d`.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let denom = n as f64 * d;
    let positive = n.div_ceil(2);
    (0..n)
        .map(|k| {
            let k = if k < positive {
                k as f64
            } else {
                k as f64 - n as f64
            };
            k / denom
        })
        .collect()
}

fn magnitudes(samples: &[f32], planner: &mut FftPlanner<f64>) -> Vec<f64> {
    let n = samples.len();
    let mut buf: Vec<Complex64> = samples
        .iter()
        .map(|&v| Complex64::new(v as f64, 0.0))
        .collect();
    if n > 0 {
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buf);
    }
    buf.iter().map(|z| z.norm()).collect()
}

fn log_series(
    mags: &[f64],
    sample_interval_us: f64,
    floor: Option<f64>,
) -> Result<SpectrumSeries> {
    let n = mags.len();
    let keep = n / 4;
    let freq_hz: Vec<f64> = fftfreq(n, sample_interval_us / 1e6)
        .into_iter()
        .take(keep)
        .collect();

    let mut log_power = Vec::with_capacity(keep);
    for (bin, &magnitude) in mags.iter().take(keep).enumerate() {
        let m = match floor {
            Some(eps) => magnitude.max(eps),
            None if magnitude > 0.0 => magnitude,
            None => return Err(Error::NonPositiveSpectrum { bin, magnitude }),
        };
        log_power.push(m.log10());
    }
    Ok(SpectrumSeries { freq_hz, log_power })
}

/// `log10 |DFT(samples)|` for the lowest quarter of bins.
///
/// With `floor = None` a zero magnitude is an error instead of being clamped.
pub fn estimate(
    samples: &[f32],
    sample_interval_us: f64,
    floor: Option<f64>,
) -> Result<SpectrumSeries> {
    let mut planner = FftPlanner::<f64>::new();
    let mags = magnitudes(samples, &mut planner);
    log_series(&mags, sample_interval_us, floor)
}

/// Spectrum of one trace, or of the mean magnitude over every trace.
pub fn estimate_from_matrix(
    matrix: &AmplitudeMatrix,
    source: SpectrumSource,
    sample_interval_us: f64,
    floor: Option<f64>,
) -> Result<SpectrumSeries> {
    match source {
        SpectrumSource::Trace(index) => {
            let samples = matrix.column(index).ok_or(Error::TraceIndexOutOfRange {
                index,
                trace_count: matrix.n_traces(),
            })?;
            estimate(samples, sample_interval_us, floor)
        }
        SpectrumSource::Mean => {
            let mut planner = FftPlanner::<f64>::new();
            let mut acc = vec![0.0f64; matrix.n_samples()];
            for column in matrix.columns() {
                for (a, m) in acc.iter_mut().zip(magnitudes(column, &mut planner)) {
                    *a += m;
                }
            }
            let n_traces = matrix.n_traces().max(1) as f64;
            acc.iter_mut().for_each(|a| *a /= n_traces);
            log_series(&acc, sample_interval_us, floor)
        }
    }
}
