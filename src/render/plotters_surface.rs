//! PNG/SVG backend built on plotters.
//!
//! Calls are buffered per panel and painted on `save`, when the output
//! format is known. Each panel's plotting area lands exactly on its page
//! rectangle; tick labels and axis titles go into bands around it.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use super::surface::{
    Axis, DrawSurface, FillStyle, HAlign, LineStyle, PanelId, RenderError, Rgba, TextStyle,
    TickFormat, VAlign,
};
use crate::core::layout::{PageGeometry, Rect};

const POINTS_PER_INCH: f64 = 72.0;

#[derive(Clone, Debug)]
enum Item {
    Line(Vec<(f64, f64)>, LineStyle),
    Fill(Vec<(f64, f64)>, FillStyle),
    Text((f64, f64), String, TextStyle),
}

#[derive(Clone, Debug)]
struct PanelState {
    rect: Rect,
    ranges: HashMap<Axis, (f64, f64)>,
    formats: HashMap<Axis, TickFormat>,
    labels: HashMap<Axis, (String, f64)>,
    title: Option<(String, f64)>,
    grid: bool,
    axes_visible: bool,
    items: Vec<Item>,
}

impl PanelState {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            ranges: HashMap::new(),
            formats: HashMap::new(),
            labels: HashMap::new(),
            title: None,
            grid: false,
            axes_visible: true,
            items: Vec::new(),
        }
    }

    fn range(&self, axis: Axis) -> (f64, f64) {
        let (a, b) = self.ranges.get(&axis).copied().unwrap_or((0.0, 1.0));
        if a == b { (a - 0.5, b + 0.5) } else { (a, b) }
    }

    fn shows_ticks(&self, axis: Axis) -> bool {
        self.axes_visible && !matches!(self.formats.get(&axis), Some(TickFormat::Hidden))
    }
}

fn backend_err<E: Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn color(c: Rgba) -> RGBAColor {
    RGBColor(c.r, c.g, c.b).mix(c.alpha)
}

pub struct PlottersSurface {
    width_px: u32,
    height_px: u32,
    dpi: f64,
    label_band_px: u32,
    panels: BTreeMap<PanelId, PanelState>,
}

impl PlottersSurface {
    pub fn new(geometry: &PageGeometry, dpi: f64) -> Self {
        let (width_px, height_px) = geometry.pixel_size(dpi);
        Self {
            width_px,
            height_px,
            dpi,
            label_band_px: (geometry.axis_label_band_in * dpi).round() as u32,
            panels: BTreeMap::new(),
        }
    }

    pub fn size_px(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn points_to_px(&self, points: f64) -> f64 {
        points * self.dpi / POINTS_PER_INCH
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut PanelState, RenderError> {
        self.panels.get_mut(&id).ok_or(RenderError::UnknownPanel(id))
    }

    fn text_style(&self, style: &TextStyle) -> plotters::style::TextStyle<'static> {
        let family = if style.monospace {
            FontFamily::Monospace
        } else {
            FontFamily::SansSerif
        };
        let h = match style.h_align {
            HAlign::Left => HPos::Left,
            HAlign::Center => HPos::Center,
            HAlign::Right => HPos::Right,
        };
        let v = match style.v_align {
            VAlign::Top => VPos::Top,
            VAlign::Center => VPos::Center,
            VAlign::Bottom => VPos::Bottom,
        };
        (family, self.points_to_px(style.size))
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(h, v))
    }

    fn paint<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(backend_err)?;
        for (id, panel) in &self.panels {
            debug!(panel = ?id, items = panel.items.len(), "painting panel");
            self.paint_panel(root, panel)?;
        }
        root.present().map_err(backend_err)
    }

    fn paint_panel<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        panel: &PanelState,
    ) -> Result<(), RenderError> {
        let px = panel.rect.scaled(self.width_px as f64, self.height_px as f64);
        if px.width < 1.0 || px.height < 1.0 {
            return Ok(());
        }
        let band = self.label_band_px;
        let left_band = if panel.shows_ticks(Axis::Y) { band } else { 0 };
        let bottom_band = if panel.shows_ticks(Axis::X) { band } else { 0 };
        let top_band = if panel.axes_visible && panel.formats.contains_key(&Axis::TopX) {
            band
        } else {
            0
        };

        let left = px.x.round() as i32;
        let top = (self.height_px as f64 - px.top()).round() as i32;
        let width = px.width.round() as u32;
        let height = px.height.round() as u32;
        // Grow the area by the label bands so the plotting area itself stays
        // exactly on the panel rectangle.
        let left_band = left_band.min(left.max(0) as u32);
        let top_band = top_band.min(top.max(0) as u32);
        let area = root.clone().shrink(
            (left - left_band as i32, top - top_band as i32),
            (width + left_band, height + top_band + bottom_band),
        );

        let (x0, x1) = panel.range(Axis::X);
        let (y0, y1) = panel.range(Axis::Y);
        // Descending y (time down) is drawn negated so plotters sees an
        // ascending range; labels undo the sign.
        let flip = y0 > y1;
        let (ya, yb) = if flip { (-y0, -y1) } else { (y0, y1) };
        let (x_lo, x_hi) = (x0.min(x1), x0.max(x1));
        let clamp = move |&(x, y): &(f64, f64)| {
            let y = if flip { -y } else { y };
            (x.clamp(x_lo, x_hi), y.clamp(ya, yb))
        };

        let mut builder = ChartBuilder::on(&area);
        builder
            .set_label_area_size(LabelAreaPosition::Left, left_band)
            .set_label_area_size(LabelAreaPosition::Bottom, bottom_band)
            .set_label_area_size(LabelAreaPosition::Top, top_band);
        let mut chart = builder
            .build_cartesian_2d(x0..x1, ya..yb)
            .map_err(backend_err)?;

        let x_fmt = panel.formats.get(&Axis::X).cloned().unwrap_or(TickFormat::Fixed(1));
        let y_fmt = panel.formats.get(&Axis::Y).cloned().unwrap_or(TickFormat::Fixed(1));
        let fx = move |v: &f64| x_fmt.format(*v).unwrap_or_default();
        let fy = move |v: &f64| y_fmt.format(if flip { -*v } else { *v }).unwrap_or_default();
        let tick_px = self.points_to_px(
            panel
                .labels
                .values()
                .map(|(_, size)| *size)
                .fold(10.0, f64::min),
        );

        if panel.axes_visible {
            let mut mesh = chart.configure_mesh();
            mesh.x_label_formatter(&fx)
                .y_label_formatter(&fy)
                .label_style((FontFamily::SansSerif, tick_px));
            if let Some((label, size)) = panel.labels.get(&Axis::X) {
                mesh.x_desc(label.as_str());
                mesh.axis_desc_style((FontFamily::SansSerif, self.points_to_px(*size)));
            }
            if let Some((label, _)) = panel.labels.get(&Axis::Y) {
                mesh.y_desc(label.as_str());
            }
            if !panel.grid {
                mesh.disable_mesh();
            }
            if !panel.shows_ticks(Axis::X) {
                mesh.disable_x_axis();
            }
            if !panel.shows_ticks(Axis::Y) {
                mesh.disable_y_axis();
            }
            mesh.draw().map_err(backend_err)?;
        }

        for item in &panel.items {
            match item {
                Item::Fill(points, style) => {
                    let pts: Vec<(f64, f64)> = points.iter().map(clamp).collect();
                    chart
                        .draw_series(std::iter::once(Polygon::new(pts, color(style.color).filled())))
                        .map_err(backend_err)?;
                }
                Item::Line(points, style) => {
                    let pts: Vec<(f64, f64)> = points.iter().map(clamp).collect();
                    let w = self.points_to_px(style.width).round().max(1.0) as u32;
                    chart
                        .draw_series(std::iter::once(PathElement::new(
                            pts,
                            color(style.color).stroke_width(w),
                        )))
                        .map_err(backend_err)?;
                }
                Item::Text(position, text, style) => {
                    let (x, y) = clamp(position);
                    chart
                        .draw_series(std::iter::once(Text::new(
                            text.clone(),
                            (x, y),
                            self.text_style(style),
                        )))
                        .map_err(backend_err)?;
                }
            }
        }

        if let Some((title, size)) = &panel.title {
            let style = self.text_style(
                &TextStyle::new(*size).aligned(HAlign::Center, VAlign::Bottom),
            );
            let cx = left + width as i32 / 2;
            let y = top - top_band as i32 - 2;
            root.draw(&Text::new(title.clone(), (cx, y), style))
                .map_err(backend_err)?;
        }

        if top_band > 0 {
            let top_fmt = panel.formats.get(&Axis::TopX).cloned().unwrap_or(TickFormat::Fixed(0));
            let ft = move |v: &f64| top_fmt.format(*v).unwrap_or_default();
            let mut dual = chart.set_secondary_coord(x0..x1, ya..yb);
            let mut axes = dual.configure_secondary_axes();
            axes.x_label_formatter(&ft)
                .y_labels(0)
                .label_style((FontFamily::SansSerif, tick_px));
            if let Some((label, _)) = panel.labels.get(&Axis::TopX) {
                axes.x_desc(label.as_str());
            }
            axes.draw().map_err(backend_err)?;
        }
        Ok(())
    }
}

impl DrawSurface for PlottersSurface {
    fn add_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), RenderError> {
        self.panels.insert(panel, PanelState::new(rect));
        Ok(())
    }

    fn set_axis_range(
        &mut self,
        panel: PanelId,
        axis: Axis,
        range: (f64, f64),
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.ranges.insert(axis, range);
        Ok(())
    }

    fn set_tick_formatter(
        &mut self,
        panel: PanelId,
        axis: Axis,
        format: TickFormat,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.formats.insert(axis, format);
        Ok(())
    }

    fn set_axis_label(
        &mut self,
        panel: PanelId,
        axis: Axis,
        label: &str,
        size: f64,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?
            .labels
            .insert(axis, (label.to_string(), size));
        Ok(())
    }

    fn set_title(&mut self, panel: PanelId, title: &str, size: f64) -> Result<(), RenderError> {
        self.panel_mut(panel)?.title = Some((title.to_string(), size));
        Ok(())
    }

    fn set_grid(&mut self, panel: PanelId, visible: bool) -> Result<(), RenderError> {
        self.panel_mut(panel)?.grid = visible;
        Ok(())
    }

    fn set_axes_visible(&mut self, panel: PanelId, visible: bool) -> Result<(), RenderError> {
        self.panel_mut(panel)?.axes_visible = visible;
        Ok(())
    }

    fn draw_polyline(
        &mut self,
        panel: PanelId,
        points: &[(f64, f64)],
        style: LineStyle,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?
            .items
            .push(Item::Line(points.to_vec(), style));
        Ok(())
    }

    fn fill_polygon(
        &mut self,
        panel: PanelId,
        points: &[(f64, f64)],
        style: FillStyle,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?
            .items
            .push(Item::Fill(points.to_vec(), style));
        Ok(())
    }

    fn draw_text(
        &mut self,
        panel: PanelId,
        position: (f64, f64),
        text: &str,
        style: TextStyle,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?
            .items
            .push(Item::Text(position, text.to_string(), style));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), RenderError> {
        let size = (self.width_px, self.height_px);
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                self.paint(&root)
            }
            "svg" => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                self.paint(&root)
            }
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::{LayoutParams, compute};

    fn surface() -> PlottersSurface {
        let g = compute(100, 2000.0, &LayoutParams::default()).unwrap();
        PlottersSurface::new(&g, 50.0)
    }

    #[test]
    fn canvas_follows_page_and_dpi() {
        let s = surface();
        assert_eq!(s.size_px(), (925, 500));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut s = surface();
        let err = s.save(Path::new("out.tiff")).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat(ext) if ext == "tiff"));
    }

    #[test]
    fn calls_need_a_placed_panel() {
        let mut s = surface();
        assert!(s.set_grid(PanelId::Histogram, true).is_err());
        s.add_panel(PanelId::Histogram, Rect::new(0.1, 0.1, 0.2, 0.2))
            .unwrap();
        s.set_axis_range(PanelId::Histogram, Axis::Y, (3.0, 3.0))
            .unwrap();
        let panel = &s.panels[&PanelId::Histogram];
        assert_eq!(panel.range(Axis::Y), (2.5, 3.5));
        assert_eq!(panel.range(Axis::X), (0.0, 1.0));
    }
}
