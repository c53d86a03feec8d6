use clap::Parser;
use std::path::PathBuf;

use crate::config::ImageFormat;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Wiggle-trace plots of SEG-Y sections")]
pub struct Args {
    /// SEG-Y file to plot
    #[arg(value_name = "FILENAME", required_unless_present = "synthetic")]
    pub filename: Option<PathBuf>,

    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Image path (defaults to FILENAME with the format's extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Plot a generated Ricker section instead of reading a file
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,

    /// Lay the page out and log draw-call counts without writing an image
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Also write the synthetic section as SEG-Y to this path
    #[arg(long, requires = "synthetic")]
    pub write_segy: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_or_synthetic_required() {
        assert!(Args::try_parse_from(["seisplot"]).is_err());
        let args = Args::try_parse_from(["seisplot", "--synthetic", "--format", "svg"]).unwrap();
        assert!(args.synthetic);
        assert_eq!(args.format, Some(ImageFormat::Svg));
        assert_eq!(args.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn positional_file() {
        let args = Args::try_parse_from(["seisplot", "line.sgy", "--dry-run"]).unwrap();
        assert_eq!(args.filename.as_deref(), Some(std::path::Path::new("line.sgy")));
        assert!(args.dry_run);
        assert!(args.output.is_none());
    }
}
