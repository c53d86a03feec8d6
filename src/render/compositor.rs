//! Lays the computed artifacts out on a [`DrawSurface`].

use std::path::Path;

use super::surface::{
    Axis, DrawSurface, FillStyle, HAlign, LineStyle, PanelId, RenderError, Rgba, TextStyle,
    TickFormat, VAlign,
};
use crate::core::histogram::HistogramSpec;
use crate::core::layout::PageGeometry;
use crate::core::spectrum::SpectrumSeries;
use crate::core::wiggle::WigglePath;

/// Header panel coordinate system: 40 cards on a 40 x 40 grid.
const HEADER_GRID: f64 = 40.0;
const HEADER_LINE_STEP: f64 = 0.95;
const HEADER_INSET: f64 = 1.0;

const WIGGLE_LINE: LineStyle = LineStyle {
    color: Rgba::BLACK,
    width: 0.2,
};
const WIGGLE_FILL: FillStyle = FillStyle {
    color: Rgba::BLACK.with_alpha(0.2),
};
const HIST_FILL: FillStyle = FillStyle {
    color: Rgba::BLACK.with_alpha(0.5),
};
const SPECTRUM_LINE: LineStyle = LineStyle {
    color: Rgba::BLACK.with_alpha(0.5),
    width: 2.0,
};

/// Everything one page shows.
#[derive(Clone, Debug)]
pub struct Figure {
    pub geometry: PageGeometry,
    pub title: String,
    pub header_lines: Vec<String>,
    /// `(first, last)` sample time in ms.
    pub time_range_ms: (f64, f64),
    pub wiggles: Vec<WigglePath>,
    /// Ensemble (CDP) number of every trace, displayed or not.
    pub ensemble_numbers: Vec<i32>,
    pub histogram: HistogramSpec,
    pub histogram_counts: Vec<u64>,
    pub histogram_edges: Vec<f64>,
    pub spectrum: SpectrumSeries,
    pub fontsize: f64,
}

fn font(base: f64, less: f64) -> f64 {
    (base - less).max(1.0)
}

/// Enough decimals to tell ticks apart across `span`.
fn decimals_for(span: f64) -> usize {
    if !(span > 0.0 && span.is_finite()) {
        return 0;
    }
    (2.0 - span.log10().floor()).clamp(0.0, 6.0) as usize
}

impl Figure {
    /// Draws every panel and saves the page to `output`.
    pub fn render<S: DrawSurface>(&self, surface: &mut S, output: &Path) -> Result<(), RenderError> {
        self.draw_seismic(surface)?;
        self.draw_title(surface)?;
        self.draw_header(surface)?;
        if !self.geometry.histogram_rect.is_empty() {
            self.draw_histogram(surface)?;
        }
        if !self.geometry.spectrum_rect.is_empty() {
            self.draw_spectrum(surface)?;
        }
        surface.save(output)
    }

    fn draw_seismic<S: DrawSurface>(&self, s: &mut S) -> Result<(), RenderError> {
        let id = PanelId::Seismic;
        let fs = self.fontsize;
        s.add_panel(id, self.geometry.seismic_panel_rect)?;

        let n_display = self.wiggles.len() as f64;
        let (t0, t1) = self.time_range_ms;
        s.set_axis_range(id, Axis::X, (-1.0, n_display))?;
        s.set_axis_range(id, Axis::Y, (t1, t0))?;

        // Ticks sit at display positions; label them with what they stand for.
        let columns: Vec<usize> = self.wiggles.iter().map(|w| w.trace_index).collect();
        let cdps: Vec<Option<i32>> = columns
            .iter()
            .map(|&c| self.ensemble_numbers.get(c).copied())
            .collect();
        let lookup = |v: f64| -> Option<usize> {
            let r = v.round();
            (r >= 0.0 && (v - r).abs() < 1e-6).then_some(r as usize)
        };
        s.set_tick_formatter(
            id,
            Axis::X,
            TickFormat::custom(move |v| match lookup(v).and_then(|i| columns.get(i)) {
                Some(c) => c.to_string(),
                None => String::new(),
            }),
        )?;
        s.set_tick_formatter(
            id,
            Axis::TopX,
            TickFormat::custom(move |v| match lookup(v).and_then(|i| cdps.get(i).copied().flatten()) {
                Some(cdp) => cdp.to_string(),
                None => String::new(),
            }),
        )?;
        s.set_tick_formatter(id, Axis::Y, TickFormat::Fixed(0))?;
        s.set_axis_label(id, Axis::X, "Trace no.", font(fs, 2.0))?;
        s.set_axis_label(id, Axis::Y, "Two-way time [ms]", font(fs, 2.0))?;
        s.set_axis_label(id, Axis::TopX, "CDP number", font(fs, 2.0))?;
        s.set_grid(id, true)?;

        for wiggle in &self.wiggles {
            s.fill_polygon(id, &wiggle.fill_polygon(), WIGGLE_FILL)?;
            s.draw_polyline(id, &wiggle.points, WIGGLE_LINE)?;
        }
        Ok(())
    }

    fn draw_title<S: DrawSurface>(&self, s: &mut S) -> Result<(), RenderError> {
        let id = PanelId::Title;
        s.add_panel(id, self.geometry.title_rect)?;
        s.set_axes_visible(id, false)?;
        s.set_axis_range(id, Axis::X, (0.0, 1.0))?;
        s.set_axis_range(id, Axis::Y, (0.0, 1.0))?;
        s.draw_text(
            id,
            (1.0, 0.0),
            &self.title,
            TextStyle::new(self.fontsize).aligned(HAlign::Right, VAlign::Bottom),
        )
    }

    fn draw_header<S: DrawSurface>(&self, s: &mut S) -> Result<(), RenderError> {
        let id = PanelId::Header;
        s.add_panel(id, self.geometry.header_rect)?;
        s.set_axis_range(id, Axis::X, (0.0, HEADER_GRID))?;
        s.set_axis_range(id, Axis::Y, (0.0, HEADER_GRID))?;
        s.set_tick_formatter(id, Axis::X, TickFormat::Hidden)?;
        s.set_tick_formatter(id, Axis::Y, TickFormat::Hidden)?;

        let style = TextStyle::new(font(self.fontsize, 2.0))
            .monospace()
            .aligned(HAlign::Left, VAlign::Top);
        for (i, line) in self.header_lines.iter().enumerate() {
            let y = HEADER_GRID - i as f64 * HEADER_LINE_STEP - HEADER_INSET;
            if y < 0.0 {
                break;
            }
            s.draw_text(id, (HEADER_INSET, y), line, style)?;
        }
        Ok(())
    }

    fn draw_histogram<S: DrawSurface>(&self, s: &mut S) -> Result<(), RenderError> {
        let id = PanelId::Histogram;
        let fs = self.fontsize;
        let (lo, hi) = self.histogram.range;
        let peak = self.histogram_counts.iter().copied().max().unwrap_or(0).max(1) as f64;

        s.add_panel(id, self.geometry.histogram_rect)?;
        s.set_axis_range(id, Axis::X, (lo, hi))?;
        s.set_axis_range(id, Axis::Y, (0.0, peak * 1.05))?;
        s.set_tick_formatter(id, Axis::X, TickFormat::Fixed(decimals_for(hi - lo)))?;
        s.set_tick_formatter(id, Axis::Y, TickFormat::Hidden)?;
        s.set_axis_label(id, Axis::X, "amplitude", font(fs, 4.0))?;
        s.set_title(id, "Histogram", font(fs, 3.0))?;

        for (edge, &count) in self.histogram_edges.windows(2).zip(&self.histogram_counts) {
            let (x0, x1) = (edge[0].max(lo), edge[1].min(hi));
            if count == 0 || x1 <= x0 {
                continue;
            }
            let c = count as f64;
            s.fill_polygon(id, &[(x0, 0.0), (x1, 0.0), (x1, c), (x0, c)], HIST_FILL)?;
        }
        Ok(())
    }

    fn draw_spectrum<S: DrawSurface>(&self, s: &mut S) -> Result<(), RenderError> {
        let id = PanelId::Spectrum;
        let fs = self.fontsize;
        s.add_panel(id, self.geometry.spectrum_rect)?;

        let spec = &self.spectrum;
        let x_range = match (spec.freq_hz.first(), spec.freq_hz.last()) {
            (Some(&a), Some(&b)) if b > a => (a, b),
            _ => (0.0, 1.0),
        };
        let (p_min, p_max) = spec
            .log_power
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });
        let y_range = if p_max > p_min {
            let pad = 0.05 * (p_max - p_min);
            (p_min - pad, p_max + pad)
        } else if p_max.is_finite() {
            (p_min - 1.0, p_max + 1.0)
        } else {
            (0.0, 1.0)
        };

        s.set_axis_range(id, Axis::X, x_range)?;
        s.set_axis_range(id, Axis::Y, y_range)?;
        s.set_tick_formatter(id, Axis::X, TickFormat::Fixed(0))?;
        s.set_tick_formatter(id, Axis::Y, TickFormat::Fixed(decimals_for(y_range.1 - y_range.0)))?;
        s.set_axis_label(id, Axis::X, "frequency [Hz]", font(fs, 4.0))?;
        s.set_axis_label(id, Axis::Y, "power [dB]", font(fs, 2.0))?;
        s.set_title(id, "Power spectrum", font(fs, 2.0))?;
        s.set_grid(id, true)?;

        if spec.len() > 1 {
            s.draw_polyline(id, &spec.points(), SPECTRUM_LINE)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_follow_span() {
        assert_eq!(decimals_for(2000.0), 0);
        assert_eq!(decimals_for(24.0), 1);
        assert_eq!(decimals_for(0.02), 4);
        assert_eq!(decimals_for(0.0), 0);
        assert_eq!(decimals_for(1e-12), 6);
    }
}
