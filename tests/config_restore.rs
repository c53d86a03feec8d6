use std::fs;
use std::num::NonZeroUsize;

use seisplot::config::{
    AppConfig, ImageFormat, LayoutConfig, OutputConfig, PlotConfig, SpectrumConfig,
};

fn assert_close(a: f64, b: f64, label: &str) {
    let diff = (a - b).abs();
    assert!(diff <= 1e-12, "{label} mismatch: {a} vs {b}");
}

fn assert_config_eq(actual: &AppConfig, expected: &AppConfig) {
    assert_close(actual.plot.tpi, expected.plot.tpi, "plot.tpi");
    assert_close(actual.plot.ips, expected.plot.ips, "plot.ips");
    assert_close(actual.plot.gain, expected.plot.gain, "plot.gain");
    assert_eq!(actual.plot.skip, expected.plot.skip);
    assert_close(actual.plot.fontsize, expected.plot.fontsize, "plot.fontsize");
    assert_close(
        actual.plot.percentile,
        expected.plot.percentile,
        "plot.percentile",
    );
    assert_close(
        actual.layout.side_label_width_in,
        expected.layout.side_label_width_in,
        "layout.side_label_width_in",
    );
    assert_close(
        actual.layout.min_page_height_in,
        expected.layout.min_page_height_in,
        "layout.min_page_height_in",
    );
    assert_close(
        actual.layout.header_height_in,
        expected.layout.header_height_in,
        "layout.header_height_in",
    );
    assert_close(actual.layout.margin_in, expected.layout.margin_in, "layout.margin_in");
    assert_close(
        actual.layout.chart_height_frac,
        expected.layout.chart_height_frac,
        "layout.chart_height_frac",
    );
    assert_close(
        actual.layout.chart_pad_frac,
        expected.layout.chart_pad_frac,
        "layout.chart_pad_frac",
    );
    assert_eq!(actual.spectrum.trace_index, expected.spectrum.trace_index);
    assert_eq!(actual.spectrum.average, expected.spectrum.average);
    assert_eq!(actual.spectrum.floor(), expected.spectrum.floor());
    assert_eq!(actual.output.format, expected.output.format);
    assert_close(actual.output.dpi, expected.output.dpi, "output.dpi");
}

#[test]
fn custom_config_survives_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restore.toml");
    let custom = AppConfig {
        plot: PlotConfig {
            tpi: 24.0,
            ips: 2.5,
            gain: 1.75,
            skip: NonZeroUsize::new(4).unwrap(),
            fontsize: 8.0,
            percentile: 97.5,
        },
        layout: LayoutConfig {
            side_label_width_in: 5.0,
            min_page_height_in: 8.5,
            header_height_in: 4.0,
            margin_in: 0.25,
            chart_height_frac: 0.1,
            chart_pad_frac: 0.04,
        },
        spectrum: SpectrumConfig {
            trace_index: 12,
            average: true,
            floor: 1e-9,
        },
        output: OutputConfig {
            format: ImageFormat::Svg,
            dpi: 150.0,
        },
    };
    fs::write(&path, toml::to_string_pretty(&custom).unwrap()).unwrap();

    let restored = AppConfig::load_or_default(&path);
    assert_config_eq(&restored, &custom);
}

#[test]
fn missing_file_yields_defaults_and_a_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.toml");

    let cfg = AppConfig::load_or_default(&path);
    assert_config_eq(&cfg, &AppConfig::default());

    let text = fs::read_to_string(&path).unwrap();
    for section in ["[plot]", "[layout]", "[spectrum]", "[output]"] {
        assert!(text.contains(section), "template lacks {section}");
    }
    assert!(
        text.lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with('['))
            .all(|l| l.starts_with("# ")),
        "every key should be commented out"
    );
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[plot\ntpi = ").unwrap();

    let cfg = AppConfig::load_or_default(&path);
    assert_config_eq(&cfg, &AppConfig::default());
    // The broken file is left for the user to fix.
    assert_eq!(fs::read_to_string(&path).unwrap(), "[plot\ntpi = ");
}
