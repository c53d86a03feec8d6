//! Page geometry driven by display density rather than pixel sizes.
//!
//! Physical size follows the data: `traces / tpi` inches wide and
//! `ips * duration` inches tall for the seismic panel, plus a fixed-width
//! side-label column holding title, text header, histogram and spectrum.
//! Rectangles are `(x, y, width, height)` fractions of the page with the
//! origin at the bottom-left corner.

use crate::error::{Error, Result};

/// Page margins in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    /// `m` above and below, `2m` left and right.
    pub fn from_base(m: f64) -> Self {
        Self {
            top: m,
            bottom: m,
            left: 2.0 * m,
            right: 2.0 * m,
        }
    }

    /// Gap between the seismic panel and the side-label column.
    pub fn mid(&self) -> f64 {
        self.right / 2.0
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::from_base(0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub traces_per_inch: f64,
    pub inches_per_second: f64,
    pub fontsize: f64,
    pub side_label_width_in: f64,
    pub min_page_height_in: f64,
    pub header_height_in: f64,
    pub margins: Margins,
    /// Height of each chart (histogram, spectrum) as a fraction of page height.
    pub chart_height_frac: f64,
    pub chart_pad_frac: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            traces_per_inch: 10.0,
            inches_per_second: 1.0,
            fontsize: 10.0,
            side_label_width_in: 6.0,
            min_page_height_in: 10.0,
            header_height_in: 5.0,
            margins: Margins::default(),
            chart_height_frac: 0.125,
            chart_pad_frac: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Scales page fractions to absolute units (inches, or pixels).
    pub fn scaled(&self, page_width: f64, page_height: f64) -> Rect {
        Rect::new(
            self.x * page_width,
            self.y * page_height,
            self.width * page_width,
            self.height * page_height,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-12;
        self.x < other.right() - EPS
            && other.x < self.right() - EPS
            && self.y < other.top() - EPS
            && other.y < self.top() - EPS
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width_in: f64,
    pub page_height_in: f64,
    pub seismic_width_in: f64,
    pub seismic_height_in: f64,
    pub seismic_panel_rect: Rect,
    pub sidelabel_start_frac: f64,
    pub title_rect: Rect,
    pub header_rect: Rect,
    pub histogram_rect: Rect,
    pub spectrum_rect: Rect,
    pub margins: Margins,
    /// Room for tick labels plus an axis title, derived from the font size.
    pub axis_label_band_in: f64,
}

impl PageGeometry {
    /// Width over height of the seismic panel in physical units.
    pub fn seismic_aspect(&self) -> f64 {
        self.seismic_width_in / self.seismic_height_in
    }

    pub fn to_inches(&self, rect: &Rect) -> Rect {
        rect.scaled(self.page_width_in, self.page_height_in)
    }

    pub fn pixel_size(&self, dpi: f64) -> (u32, u32) {
        (
            (self.page_width_in * dpi).round().max(1.0) as u32,
            (self.page_height_in * dpi).round().max(1.0) as u32,
        )
    }

    pub fn panels(&self) -> [(&'static str, Rect); 5] {
        [
            ("seismic", self.seismic_panel_rect),
            ("title", self.title_rect),
            ("header", self.header_rect),
            ("histogram", self.histogram_rect),
            ("spectrum", self.spectrum_rect),
        ]
    }
}

fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::DegenerateLayout { parameter, value })
    }
}

fn require_non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::DegenerateLayout { parameter, value })
    }
}

/// Computes the page for `trace_count` traces spanning `sample_duration_ms`.
pub fn compute(
    trace_count: usize,
    sample_duration_ms: f64,
    params: &LayoutParams,
) -> Result<PageGeometry> {
    require_positive("traces_per_inch", params.traces_per_inch)?;
    require_positive("inches_per_second", params.inches_per_second)?;
    require_positive("trace_count", trace_count as f64)?;
    require_positive("sample_duration_ms", sample_duration_ms)?;
    require_positive("fontsize", params.fontsize)?;
    require_non_negative("side_label_width_in", params.side_label_width_in)?;
    require_non_negative("min_page_height_in", params.min_page_height_in)?;
    require_non_negative("header_height_in", params.header_height_in)?;
    require_non_negative("chart_height_frac", params.chart_height_frac)?;
    require_non_negative("chart_pad_frac", params.chart_pad_frac)?;
    let m = params.margins;
    for (name, v) in [
        ("margin_top", m.top),
        ("margin_bottom", m.bottom),
        ("margin_left", m.left),
        ("margin_right", m.right),
    ] {
        require_non_negative(name, v)?;
    }

    let seismic_width = trace_count as f64 / params.traces_per_inch;
    let seismic_height = params.inches_per_second * sample_duration_ms / 1000.0;
    let wsl = params.side_label_width_in;

    let h = params
        .min_page_height_in
        .max(seismic_height + m.top + m.bottom);
    let w = m.left + seismic_width + wsl + m.right + m.mid();
    let ssl = (m.left + seismic_width + m.mid()) / w;

    // Top-aligned under the top margin so the physical aspect ratio is exactly
    // seismic_width / seismic_height even when the minimum height kicks in.
    let seismic_panel_rect = Rect::new(
        m.left / w,
        (h - m.top - seismic_height) / h,
        seismic_width / w,
        seismic_height / h,
    );

    let column_width = wsl / w;
    let title_h = m.top / 2.0;
    let title_rect = Rect::new(ssl, (h - m.top - title_h) / h, column_width, title_h / h);

    let header_top = h - m.top - title_h;
    let header_h = params
        .header_height_in
        .min(header_top - m.bottom)
        .max(0.0);
    let header_rect = Rect::new(ssl, (header_top - header_h) / h, column_width, header_h / h);

    // Charts sit 1.5 bottom margins above the page edge and never reach into
    // the header; when squeezed, they share what is left.
    let pad_y = params.chart_pad_frac;
    let base = 1.5 * m.bottom / h;
    let available = header_rect.y - base - pad_y;
    let chart_h = params.chart_height_frac.min(available / 2.0).max(0.0);

    let pad_x = (params.chart_pad_frac * w).min(wsl / 4.0) / w;
    let chart_x = ssl + pad_x;
    let chart_w = (column_width - 2.0 * pad_x).max(0.0);
    let spectrum_rect = Rect::new(chart_x, base, chart_w, chart_h);
    let histogram_rect = Rect::new(chart_x, base + chart_h + pad_y, chart_w, chart_h);

    Ok(PageGeometry {
        page_width_in: w,
        page_height_in: h,
        seismic_width_in: seismic_width,
        seismic_height_in: seismic_height,
        seismic_panel_rect,
        sidelabel_start_frac: ssl,
        title_rect,
        header_rect,
        histogram_rect,
        spectrum_rect,
        margins: m,
        axis_label_band_in: 2.5 * params.fontsize / 72.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(tpi: f64, ips: f64) -> LayoutParams {
        LayoutParams {
            traces_per_inch: tpi,
            inches_per_second: ips,
            ..LayoutParams::default()
        }
    }

    #[test]
    fn density_sets_seismic_size() {
        let g = compute(100, 2000.0, &params(10.0, 2.0)).unwrap();
        assert_eq!(g.seismic_width_in, 10.0);
        assert_eq!(g.seismic_height_in, 4.0);
        // 1 + 10 + 6 + 1 + 0.5
        assert_relative_eq!(g.page_width_in, 18.5);
        // 4 + 0.5 + 0.5 is below the minimum height
        assert_relative_eq!(g.page_height_in, 10.0);
        assert_relative_eq!(g.sidelabel_start_frac, 11.5 / 18.5);
    }

    #[test]
    fn tall_sections_grow_the_page() {
        let g = compute(50, 6000.0, &params(25.0, 5.0)).unwrap();
        assert_relative_eq!(g.seismic_height_in, 30.0);
        assert_relative_eq!(g.page_height_in, 31.0);
        let panel = g.to_inches(&g.seismic_panel_rect);
        assert_relative_eq!(panel.y, 0.5, epsilon = 1e-9);
        assert_relative_eq!(panel.top(), 30.5, epsilon = 1e-9);
    }

    #[test]
    fn aspect_is_physical_data_aspect() {
        for (n, dur, tpi, ips) in [
            (100, 2000.0, 10.0, 2.0),
            (12, 500.0, 24.0, 3.5),
            (1000, 4000.0, 40.0, 6.0),
        ] {
            let g = compute(n, dur, &params(tpi, ips)).unwrap();
            let panel = g.to_inches(&g.seismic_panel_rect);
            let expected = (n as f64 / tpi) / (ips * dur / 1000.0);
            assert_relative_eq!(panel.width / panel.height, expected, max_relative = 1e-12);
            assert_relative_eq!(g.seismic_aspect(), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn zero_density_is_degenerate() {
        let err = compute(100, 2000.0, &params(0.0, 2.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateLayout {
                parameter: "traces_per_inch",
                ..
            }
        ));
        let err = compute(100, 2000.0, &params(10.0, -1.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateLayout {
                parameter: "inches_per_second",
                ..
            }
        ));
    }

    #[test]
    fn zero_duration_is_degenerate() {
        let err = compute(10, 0.0, &params(10.0, 2.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateLayout {
                parameter: "sample_duration_ms",
                ..
            }
        ));
    }

    #[test]
    fn panels_stay_on_page_and_apart() {
        for min_h in [4.0, 10.0, 30.0] {
            let p = LayoutParams {
                min_page_height_in: min_h,
                ..params(10.0, 2.0)
            };
            let g = compute(100, 2000.0, &p).unwrap();
            let panels = g.panels();
            for (name, r) in panels {
                assert!(r.x >= 0.0 && r.right() <= 1.0 + 1e-12, "{name} x out of page");
                assert!(r.y >= 0.0 && r.top() <= 1.0 + 1e-12, "{name} y out of page");
            }
            for (i, (a_name, a)) in panels.iter().enumerate() {
                for (b_name, b) in panels.iter().skip(i + 1) {
                    if a.is_empty() || b.is_empty() {
                        continue;
                    }
                    assert!(!a.overlaps(b), "{a_name} overlaps {b_name} (min_h {min_h})");
                }
            }
            let m = g.margins;
            let top_margin = 1.0 - m.top / g.page_height_in;
            let bottom_margin = m.bottom / g.page_height_in;
            for (name, r) in panels {
                assert!(r.top() <= top_margin + 1e-12, "{name} in top margin");
                assert!(r.y >= bottom_margin - 1e-12, "{name} in bottom margin");
            }
        }
    }

    #[test]
    fn side_column_starts_after_seismic_and_gap() {
        let g = compute(100, 2000.0, &params(10.0, 2.0)).unwrap();
        let gap = g.sidelabel_start_frac - g.seismic_panel_rect.right();
        assert_relative_eq!(gap * g.page_width_in, g.margins.mid(), epsilon = 1e-9);
        assert_relative_eq!(g.header_rect.x, g.sidelabel_start_frac);
        assert_relative_eq!(g.to_inches(&g.header_rect).height, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn pixel_size_rounds_page_at_dpi() {
        let g = compute(100, 2000.0, &params(10.0, 2.0)).unwrap();
        assert_eq!(g.pixel_size(100.0), (1850, 1000));
    }
}
