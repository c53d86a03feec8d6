//! One plotting run: trace records in, a composed page out.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ImageFormat};
use crate::core::ingest::{self, IngestedSection};
use crate::core::matrix::TraceRecord;
use crate::core::spectrum::{self, SpectrumSource};
use crate::core::stats::{self, Statistics};
use crate::core::{histogram, layout, wiggle};
use crate::error::Result;
use crate::render::{DrawSurface, Figure};

/// What a run computed, for logging and callers that want the numbers.
#[derive(Clone, Debug)]
pub struct PlotSummary {
    pub trace_count: usize,
    pub sample_count: usize,
    pub sample_interval_us: f64,
    pub t_start_ms: f64,
    pub t_end_ms: f64,
    pub stats: Statistics,
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub displayed_traces: usize,
    pub bin_count: usize,
    pub spectrum_source: SpectrumSource,
}

impl PlotSummary {
    pub fn log(&self) {
        info!(
            n_traces = self.trace_count,
            n_samples = self.sample_count,
            dt_us = self.sample_interval_us,
            t_start_ms = self.t_start_ms,
            t_end_ms = self.t_end_ms,
            max_val = self.stats.max,
            min_val = self.stats.min,
            clip_val = self.stats.clip_val,
            "section statistics"
        );
        info!(
            width_in = self.page_width_in,
            height_in = self.page_height_in,
            displayed = self.displayed_traces,
            "page geometry"
        );
    }
}

/// `input` with its extension swapped for the image format's.
pub fn output_path(input: &Path, format: ImageFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Picks the spectrum source, falling back to the last trace when the
/// configured index is past the end.
fn resolve_source(source: SpectrumSource, trace_count: usize) -> SpectrumSource {
    match source {
        SpectrumSource::Trace(index) if index >= trace_count => {
            let last = trace_count.saturating_sub(1);
            warn!(
                requested = index,
                trace_count,
                using = last,
                "spectrum trace index out of range, using last trace"
            );
            SpectrumSource::Trace(last)
        }
        other => other,
    }
}

/// Runs every numeric stage and assembles the page without drawing it.
pub fn prepare<I>(
    records: I,
    title: &str,
    header_lines: Vec<String>,
    config: &AppConfig,
) -> Result<(Figure, PlotSummary)>
where
    I: IntoIterator<Item = TraceRecord>,
{
    config.validate()?;
    let IngestedSection {
        matrix,
        timebase,
        metadata,
        trace_count,
        sample_count,
        sample_interval_us,
    } = ingest::ingest(records)?;

    let stats = stats::estimate(&matrix, config.plot.percentile)?;
    let geometry = layout::compute(trace_count, timebase.duration_ms(), &config.layout_params())?;
    let wiggles = wiggle::build(
        &matrix,
        &timebase,
        stats.normalization(),
        config.wiggle_params(),
    )?;
    let hist = histogram::from_statistics(&stats)?;
    let histogram_counts = hist.counts(&matrix);
    let histogram_edges = hist.edges();
    debug!(bins = hist.bin_count, "histogram sized");

    let source = resolve_source(config.spectrum.source(), trace_count);
    let spectrum = spectrum::estimate_from_matrix(
        &matrix,
        source,
        sample_interval_us,
        config.spectrum.floor(),
    )?;
    debug!(bins = spectrum.len(), peak_hz = ?spectrum.peak_hz(), "spectrum estimated");

    let summary = PlotSummary {
        trace_count,
        sample_count,
        sample_interval_us,
        t_start_ms: timebase.start_ms(),
        t_end_ms: timebase.end_ms(),
        stats,
        page_width_in: geometry.page_width_in,
        page_height_in: geometry.page_height_in,
        displayed_traces: wiggles.len(),
        bin_count: hist.bin_count,
        spectrum_source: source,
    };

    let figure = Figure {
        geometry,
        title: title.to_string(),
        header_lines,
        time_range_ms: (timebase.start_ms(), timebase.end_ms()),
        wiggles,
        ensemble_numbers: metadata.ensemble_number,
        histogram: hist,
        histogram_counts,
        histogram_edges,
        spectrum,
        fontsize: config.plot.fontsize,
    };
    Ok((figure, summary))
}

/// [`prepare`], then draw on `surface` and save to `output`.
pub fn run<I, S>(
    records: I,
    title: &str,
    header_lines: Vec<String>,
    config: &AppConfig,
    surface_for: impl FnOnce(&Figure) -> S,
    output: &Path,
) -> Result<PlotSummary>
where
    I: IntoIterator<Item = TraceRecord>,
    S: DrawSurface,
{
    let (figure, summary) = prepare(records, title, header_lines, config)?;
    summary.log();
    let mut surface = surface_for(&figure);
    figure.render(&mut surface, output)?;
    info!(path = %output.display(), "saved figure");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_swaps_extension() {
        assert_eq!(
            output_path(Path::new("data/line.sgy"), ImageFormat::Png),
            PathBuf::from("data/line.png")
        );
        assert_eq!(
            output_path(Path::new("line"), ImageFormat::Svg),
            PathBuf::from("line.svg")
        );
    }

    #[test]
    fn spectrum_index_past_end_uses_last_trace() {
        assert_eq!(
            resolve_source(SpectrumSource::Trace(1), 1),
            SpectrumSource::Trace(0)
        );
        assert_eq!(
            resolve_source(SpectrumSource::Trace(2), 5),
            SpectrumSource::Trace(2)
        );
        assert_eq!(resolve_source(SpectrumSource::Mean, 1), SpectrumSource::Mean);
    }
}
