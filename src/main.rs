// Entry point: reads a SEG-Y file (or builds a synthetic one) and plots it.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use seisplot::cli::Args;
use seisplot::config::AppConfig;
use seisplot::core::matrix::TraceRecord;
use seisplot::core::synthetic;
use seisplot::logging::init_logging;
use seisplot::pipeline;
use seisplot::render::{PanelId, PlottersSurface, RecordingSurface};
use seisplot::segy;

const SYNTHETIC_TRACES: usize = 120;
const SYNTHETIC_SAMPLES: usize = 500;
const SYNTHETIC_DT_US: f64 = 4000.0;
const SYNTHETIC_SEED: u64 = 7;

struct Section {
    title: String,
    header_lines: Vec<String>,
    traces: Vec<TraceRecord>,
    /// Output path before the image extension is applied.
    stem_path: PathBuf,
}

fn load_file(path: &Path) -> Result<Section> {
    let dataset =
        segy::read_path(path).with_context(|| format!("reading SEG-Y {}", path.display()))?;
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Section {
        title,
        header_lines: dataset.header_lines(),
        traces: dataset.traces,
        stem_path: path.to_path_buf(),
    })
}

fn synthetic_section(write_segy: Option<&Path>) -> Result<Section> {
    let traces = synthetic::ricker_section(
        SYNTHETIC_TRACES,
        SYNTHETIC_SAMPLES,
        SYNTHETIC_DT_US,
        SYNTHETIC_SEED,
    );
    let header_lines = vec![
        "SYNTHETIC RICKER SECTION".to_string(),
        format!("TRACES {SYNTHETIC_TRACES}  SAMPLES {SYNTHETIC_SAMPLES}  DT {SYNTHETIC_DT_US} US"),
        "25 HZ WAVELET, THREE DIPPING REFLECTORS".to_string(),
    ];
    if let Some(path) = write_segy {
        segy::writer::write_path(path, &header_lines, &traces)
            .with_context(|| format!("writing SEG-Y {}", path.display()))?;
        info!(path = %path.display(), "wrote synthetic SEG-Y");
    }
    Ok(Section {
        title: "synthetic".to_string(),
        header_lines,
        traces,
        stem_path: PathBuf::from("synthetic"),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = AppConfig::load_or_default(&args.config);
    if let Some(format) = args.format {
        config.output.format = format;
    }
    config.validate().context("invalid configuration")?;

    let section = match &args.filename {
        Some(path) if !args.synthetic => load_file(path)?,
        _ => synthetic_section(args.write_segy.as_deref())?,
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| pipeline::output_path(&section.stem_path, config.output.format));

    if args.dry_run {
        let (figure, summary) =
            pipeline::prepare(section.traces, &section.title, section.header_lines, &config)?;
        summary.log();
        let mut surface = RecordingSurface::new();
        figure.render(&mut surface, &output)?;
        for panel in [
            PanelId::Seismic,
            PanelId::Title,
            PanelId::Header,
            PanelId::Histogram,
            PanelId::Spectrum,
        ] {
            let (lines, polygons, texts) = surface.counts(panel);
            info!(?panel, lines, polygons, texts, "dry run draw calls");
        }
        return Ok(());
    }

    let dpi = config.output.dpi;
    pipeline::run(
        section.traces,
        &section.title,
        section.header_lines,
        &config,
        |figure| PlottersSurface::new(&figure.geometry, dpi),
        &output,
    )
    .with_context(|| format!("plotting to {}", output.display()))?;
    Ok(())
}
