pub mod compositor;
pub mod plotters_surface;
pub mod recording;
pub mod surface;

pub use compositor::Figure;
pub use plotters_surface::PlottersSurface;
pub use recording::RecordingSurface;
pub use surface::{DrawSurface, PanelId, RenderError};
