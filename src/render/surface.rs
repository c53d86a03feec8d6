//! The drawing capability the compositor paints through.
//!
//! Panels are placed once with a page-fraction rectangle; everything after
//! that is in the panel's own data coordinates. Nothing here knows about a
//! concrete graphics library.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::core::layout::Rect;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown panel {0:?}")]
    UnknownPanel(PanelId),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("drawing backend failed: {0}")]
    Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Seismic,
    Title,
    Header,
    Histogram,
    Spectrum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    /// Secondary x axis along the top edge, sharing the x range.
    TopX,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Rgba,
    /// Points.
    pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillStyle {
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub monospace: bool,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl TextStyle {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            monospace: false,
            h_align: HAlign::Left,
            v_align: VAlign::Bottom,
        }
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }

    pub fn aligned(mut self, h_align: HAlign, v_align: VAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }
}

/// How tick values on an axis become labels.
#[derive(Clone)]
pub enum TickFormat {
    /// `%.Nf`
    Fixed(usize),
    /// No ticks or labels on this axis.
    Hidden,
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl TickFormat {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// `None` when the axis is hidden.
    pub fn format(&self, value: f64) -> Option<String> {
        match self {
            Self::Fixed(decimals) => Some(format!("{:.*}", *decimals, value)),
            Self::Hidden => None,
            Self::Custom(f) => Some(f(value)),
        }
    }
}

impl fmt::Debug for TickFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(d) => write!(f, "Fixed({d})"),
            Self::Hidden => write!(f, "Hidden"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

pub trait DrawSurface {
    /// Places a panel at `rect` (page fractions, origin bottom-left).
    fn add_panel(&mut self, panel: PanelId, rect: Rect) -> Result<(), RenderError>;

    /// `range.0` maps to the left/bottom edge; pass a descending range to
    /// flip an axis.
    fn set_axis_range(
        &mut self,
        panel: PanelId,
        axis: Axis,
        range: (f64, f64),
    ) -> Result<(), RenderError>;

    fn set_tick_formatter(
        &mut self,
        panel: PanelId,
        axis: Axis,
        format: TickFormat,
    ) -> Result<(), RenderError>;

    fn set_axis_label(
        &mut self,
        panel: PanelId,
        axis: Axis,
        label: &str,
        size: f64,
    ) -> Result<(), RenderError>;

    fn set_title(&mut self, panel: PanelId, title: &str, size: f64) -> Result<(), RenderError>;

    fn set_grid(&mut self, panel: PanelId, visible: bool) -> Result<(), RenderError>;

    /// Hides frame, ticks and labels.
    fn set_axes_visible(&mut self, panel: PanelId, visible: bool) -> Result<(), RenderError>;

    fn draw_polyline(
        &mut self,
        panel: PanelId,
        points: &[(f64, f64)],
        style: LineStyle,
    ) -> Result<(), RenderError>;

    fn fill_polygon(
        &mut self,
        panel: PanelId,
        points: &[(f64, f64)],
        style: FillStyle,
    ) -> Result<(), RenderError>;

    fn draw_text(
        &mut self,
        panel: PanelId,
        position: (f64, f64),
        text: &str,
        style: TextStyle,
    ) -> Result<(), RenderError>;

    fn save(&mut self, path: &Path) -> Result<(), RenderError>;
}
