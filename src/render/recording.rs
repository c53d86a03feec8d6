//! In-memory surface: keeps every call for inspection instead of painting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::surface::{
    Axis, DrawSurface, FillStyle, LineStyle, PanelId, RenderError, TextStyle, TickFormat,
};
use crate::core::layout::Rect;

#[derive(Clone, Debug)]
pub enum DrawCall {
    Polyline {
        panel: PanelId,
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Polygon {
        panel: PanelId,
        points: Vec<(f64, f64)>,
        style: FillStyle,
    },
    Text {
        panel: PanelId,
        position: (f64, f64),
        text: String,
        style: TextStyle,
    },
}

impl DrawCall {
    pub fn panel(&self) -> PanelId {
        match self {
            Self::Polyline { panel, .. } | Self::Polygon { panel, .. } | Self::Text { panel, .. } => {
                *panel
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordedPanel {
    pub rect: Option<Rect>,
    pub ranges: Vec<(Axis, (f64, f64))>,
    pub tick_formats: Vec<(Axis, TickFormat)>,
    pub labels: Vec<(Axis, String)>,
    pub title: Option<String>,
    pub grid: bool,
    pub axes_visible: bool,
}

impl RecordedPanel {
    pub fn range(&self, axis: Axis) -> Option<(f64, f64)> {
        self.ranges
            .iter()
            .rev()
            .find(|(a, _)| *a == axis)
            .map(|(_, r)| *r)
    }

    pub fn tick_format(&self, axis: Axis) -> Option<&TickFormat> {
        self.tick_formats
            .iter()
            .rev()
            .find(|(a, _)| *a == axis)
            .map(|(_, f)| f)
    }

    pub fn label(&self, axis: Axis) -> Option<&str> {
        self.labels
            .iter()
            .rev()
            .find(|(a, _)| *a == axis)
            .map(|(_, l)| l.as_str())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    panels: BTreeMap<PanelId, RecordedPanel>,
    calls: Vec<DrawCall>,
    saved: Vec<PathBuf>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn panel(&self, id: PanelId) -> Option<&RecordedPanel> {
        self.panels.get(&id)
    }

    pub fn saved_paths(&self) -> &[PathBuf] {
        &self.saved
    }

    /// `(polylines, polygons, texts)` drawn on `panel`.
    pub fn counts(&self, panel: PanelId) -> (usize, usize, usize) {
        self.calls
            .iter()
            .filter(|c| c.panel() == panel)
            .fold((0, 0, 0), |(l, p, t), c| match c {
                DrawCall::Polyline { .. } => (l + 1, p, t),
                DrawCall::Polygon { .. } => (l, p + 1, t),
                DrawCall::Text { .. } => (l, p, t + 1),
            })
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut RecordedPanel, RenderError> {
        self.panels.get_mut(&id).ok_or(RenderError::UnknownPanel(id))
    }
}

impl DrawSurface for RecordingSurface {
    fn add_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), RenderError> {
        self.panels.insert(
            panel,
            RecordedPanel {
                rect: Some(rect),
                axes_visible: true,
                ..RecordedPanel::default()
            },
        );
        Ok(())
    }

    fn set_axis_range(
        &mut self,
        panel: PanelId,
        axis: Axis,
        range: (f64, f64),
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.ranges.push((axis, range));
        Ok(())
    }

    fn set_tick_formatter(
        &mut self,
        panel: PanelId,
        axis: Axis,
        format: TickFormat,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.tick_formats.push((axis, format));
        Ok(())
    }

    fn set_axis_label(
        &mut self,
        panel: PanelId,
        axis: Axis,
        label: &str,
        _size: f64,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?.labels.push((axis, label.to_string()));
        Ok(())
    }

    fn set_title(&mut self, panel: PanelId, title: &str, _size: f64) -> Result<(), RenderError> {
        self.panel_mut(panel)?.title = Some(title.to_string());
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
        self.panel_mut(panel)?;
        self.calls.push(DrawCall::Polyline {
            panel,
            points: points.to_vec(),
            style,
        });
        Ok(())
    }

    fn fill_polygon(
        &mut self,
        panel: PanelId,
        points: &[(f64, f64)],
        style: FillStyle,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?;
        self.calls.push(DrawCall::Polygon {
            panel,
            points: points.to_vec(),
            style,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        panel: PanelId,
        position: (f64, f64),
        text: &str,
        style: TextStyle,
    ) -> Result<(), RenderError> {
        self.panel_mut(panel)?;
        self.calls.push(DrawCall::Text {
            panel,
            position,
            text: text.to_string(),
            style,
        });
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), RenderError> {
        self.saved.push(path.to_path_buf());
        Ok(())
    }
}
