use std::fs;

use seisplot::config::{AppConfig, ImageFormat};
use seisplot::core::synthetic::ricker_section;
use seisplot::pipeline;
use seisplot::render::{PlottersSurface, RenderError};

fn plot_to(format: ImageFormat) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let output = pipeline::output_path(&dir.path().join("line.sgy"), format);
    let header = vec!["LINE 3".to_string(), "STACK".to_string()];
    let summary = pipeline::run(
        ricker_section(24, 200, 4000.0, 21),
        "line.sgy",
        header,
        &AppConfig::default(),
        |figure| PlottersSurface::new(&figure.geometry, 50.0),
        &output,
    )
    .unwrap();
    assert_eq!(summary.trace_count, 24);
    (dir, output)
}

#[test]
fn svg_page_is_written_with_every_panel() {
    let (_dir, path) = plot_to(ImageFormat::Svg);
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("svg"));
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"), "not an svg document");
    for text in ["CDP number", "Two-way time [ms]", "Histogram", "Power spectrum", "LINE 3"] {
        assert!(svg.contains(text), "missing {text:?}");
    }
}

#[test]
fn png_page_is_written() {
    let (_dir, path) = plot_to(ImageFormat::Png);
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.len() > 8);
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn plotting_a_short_page_with_squeezed_charts_still_saves() {
    // A tall margin leaves the charts no room; their panels are skipped.
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default();
    cfg.layout.min_page_height_in = 0.0;
    cfg.layout.margin_in = 1.0;
    let output = dir.path().join("short.svg");
    pipeline::run(
        ricker_section(12, 100, 2000.0, 4),
        "short",
        Vec::new(),
        &cfg,
        |figure| PlottersSurface::new(&figure.geometry, 40.0),
        &output,
    )
    .unwrap();
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn unsupported_extension_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("line.bmpx");
    let err = pipeline::run(
        ricker_section(4, 64, 4000.0, 1),
        "line",
        Vec::new(),
        &AppConfig::default(),
        |figure| PlottersSurface::new(&figure.geometry, 50.0),
        &output,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        seisplot::Error::Render(RenderError::UnsupportedFormat(ref ext)) if ext == "bmpx"
    ));
    assert!(!output.exists());
}
