//! Error taxonomy for a plotting run.
//!
//! Every kind is fatal for the current invocation; nothing here is retried.

use thiserror::Error;

use crate::render::surface::RenderError;
use crate::segy::SegyError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A trace disagrees with the first trace on sample count or interval.
    #[error(
        "trace {trace_index} has {found_samples} samples at {found_interval_us} us, \
         expected {expected_samples} samples at {expected_interval_us} us"
    )]
    InconsistentGeometry {
        trace_index: usize,
        expected_samples: usize,
        found_samples: usize,
        expected_interval_us: f64,
        found_interval_us: f64,
    },

    #[error("dataset is empty ({traces} traces, {samples} samples per trace)")]
    EmptyDataset { traces: usize, samples: usize },

    #[error("degenerate layout: {parameter} = {value}")]
    DegenerateLayout { parameter: &'static str, value: f64 },

    #[error("cannot normalize wiggles by clip value {clip_val}")]
    ZeroNormalization { clip_val: f64 },

    #[error("spectrum magnitude {magnitude} at bin {bin} has no logarithm")]
    NonPositiveSpectrum { bin: usize, magnitude: f64 },

    #[error("histogram amplitude range is degenerate (largest |amplitude| = {largest})")]
    DegenerateHistogram { largest: f64 },

    #[error("percentile {percentile} is outside (0, 100]")]
    InvalidPercentile { percentile: f64 },

    #[error("trace index {index} out of range for {trace_count} traces")]
    TraceIndexOutOfRange { index: usize, trace_count: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Segy(#[from] SegyError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
