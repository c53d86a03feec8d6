use crate::core::layout::{LayoutParams, Margins};
use crate::core::spectrum::{EPS_MAGNITUDE, SpectrumSource};
use crate::core::stats::DEFAULT_PERCENTILE;
use crate::core::wiggle::WiggleParams;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Traces per inch.
    #[serde(default = "PlotConfig::default_tpi")]
    pub tpi: f64,
    /// Inches per second of two-way time.
    #[serde(default = "PlotConfig::default_ips")]
    pub ips: f64,
    #[serde(default = "PlotConfig::default_gain")]
    pub gain: f64,
    #[serde(default = "PlotConfig::default_skip")]
    pub skip: NonZeroUsize,
    #[serde(default = "PlotConfig::default_fontsize")]
    pub fontsize: f64,
    #[serde(default = "PlotConfig::default_percentile")]
    pub percentile: f64,
}

impl PlotConfig {
    fn default_tpi() -> f64 {
        10.0
    }
    fn default_ips() -> f64 {
        1.0
    }
    fn default_gain() -> f64 {
        1.0
    }
    fn default_skip() -> NonZeroUsize {
        NonZeroUsize::MIN
    }
    fn default_fontsize() -> f64 {
        10.0
    }
    fn default_percentile() -> f64 {
        DEFAULT_PERCENTILE
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            tpi: Self::default_tpi(),
            ips: Self::default_ips(),
            gain: Self::default_gain(),
            skip: Self::default_skip(),
            fontsize: Self::default_fontsize(),
            percentile: Self::default_percentile(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_side_label_width_in")]
    pub side_label_width_in: f64,
    #[serde(default = "LayoutConfig::default_min_page_height_in")]
    pub min_page_height_in: f64,
    #[serde(default = "LayoutConfig::default_header_height_in")]
    pub header_height_in: f64,
    /// Top/bottom margin; left/right get twice this.
    #[serde(default = "LayoutConfig::default_margin_in")]
    pub margin_in: f64,
    #[serde(default = "LayoutConfig::default_chart_height_frac")]
    pub chart_height_frac: f64,
    #[serde(default = "LayoutConfig::default_chart_pad_frac")]
    pub chart_pad_frac: f64,
}

impl LayoutConfig {
    fn default_side_label_width_in() -> f64 {
        6.0
    }
    fn default_min_page_height_in() -> f64 {
        10.0
    }
    fn default_header_height_in() -> f64 {
        5.0
    }
    fn default_margin_in() -> f64 {
        0.5
    }
    fn default_chart_height_frac() -> f64 {
        0.125
    }
    fn default_chart_pad_frac() -> f64 {
        0.05
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            side_label_width_in: Self::default_side_label_width_in(),
            min_page_height_in: Self::default_min_page_height_in(),
            header_height_in: Self::default_header_height_in(),
            margin_in: Self::default_margin_in(),
            chart_height_frac: Self::default_chart_height_frac(),
            chart_pad_frac: Self::default_chart_pad_frac(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// Trace whose spectrum is shown when `average` is off.
    #[serde(default = "SpectrumConfig::default_trace_index")]
    pub trace_index: usize,
    /// Average magnitudes over every trace instead.
    #[serde(default)]
    pub average: bool,
    /// Magnitude floor before the log; `<= 0` turns zero magnitudes into an error.
    #[serde(default = "SpectrumConfig::default_floor")]
    pub floor: f64,
}

impl SpectrumConfig {
    fn default_trace_index() -> usize {
        1
    }
    fn default_floor() -> f64 {
        EPS_MAGNITUDE
    }

    pub fn source(&self) -> SpectrumSource {
        if self.average {
            SpectrumSource::Mean
        } else {
            SpectrumSource::Trace(self.trace_index)
        }
    }

    pub fn floor(&self) -> Option<f64> {
        (self.floor > 0.0).then_some(self.floor)
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            trace_index: Self::default_trace_index(),
            average: false,
            floor: Self::default_floor(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl Default for ImageFormat {
    fn default() -> Self {
        Self::Png
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "OutputConfig::default_dpi")]
    pub dpi: f64,
}

impl OutputConfig {
    fn default_dpi() -> f64 {
        100.0
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::default(),
            dpi: Self::default_dpi(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Comments out every key of a serialized config, keeping section headers.
    fn commented_template(text: &str) -> String {
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
            } else {
                commented.push_str("# ");
                commented.push_str(line);
                commented.push('\n');
            }
        }
        commented
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "failed to parse config, using defaults");
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to read config, using defaults");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => {
                if let Err(err) = fs::write(path, Self::commented_template(&text)) {
                    warn!(path = %path.display(), %err, "failed to write default config");
                } else {
                    info!(path = %path.display(), "wrote default config");
                }
            }
            Err(err) => warn!(%err, "failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.plot;
        for (parameter, value) in [("tpi", p.tpi), ("ips", p.ips)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::DegenerateLayout { parameter, value });
            }
        }
        if !(p.percentile > 0.0 && p.percentile <= 100.0) {
            return Err(Error::InvalidPercentile {
                percentile: p.percentile,
            });
        }
        if !(p.fontsize > 0.0 && p.fontsize.is_finite()) {
            return Err(Error::Config(format!(
                "fontsize must be positive, got {}",
                p.fontsize
            )));
        }
        if !(self.output.dpi > 0.0 && self.output.dpi.is_finite()) {
            return Err(Error::Config(format!(
                "dpi must be positive, got {}",
                self.output.dpi
            )));
        }
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        let l = &self.layout;
        LayoutParams {
            traces_per_inch: self.plot.tpi,
            inches_per_second: self.plot.ips,
            fontsize: self.plot.fontsize,
            side_label_width_in: l.side_label_width_in,
            min_page_height_in: l.min_page_height_in,
            header_height_in: l.header_height_in,
            margins: Margins::from_base(l.margin_in),
            chart_height_frac: l.chart_height_frac,
            chart_pad_frac: l.chart_pad_frac,
        }
    }

    pub fn wiggle_params(&self) -> WiggleParams {
        WiggleParams {
            skip: self.plot.skip,
            gain: self.plot.gain,
        }
    }
}
