//! Render one metaball frame per line of a position timeline.
//!
//! Usage (example):
//!   metaballs render_frames --width 1600 --height 900 positions.txt frames/
//!
//! Then assemble the frames:
//!   ffmpeg -framerate 30 -i frames/frame%09d.png -pix_fmt yuv420p metaballs.mp4

use clap::{Parser, Subcommand};
use metaballs::{
    ConfigError, DEFAULT_MARKER_SIZE, DEFAULT_MASK_THRESHOLD, RenderConfig, RenderError,
};
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "metaballs", version, about = "Render cell positions as metaball frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write frameNNNNNNNNN.png for every line of the input
    #[command(name = "render_frames", alias = "render-frames")]
    RenderFrames(RenderArgs),
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    /// Field resolution (and image width unless --dpi is given)
    #[arg(short = 'x', long)]
    width: u32,

    /// Field resolution (and image height unless --dpi is given)
    #[arg(short = 'y', long)]
    height: u32,

    /// Size the image as a 16x9 inch figure at this many pixels per inch
    #[arg(long)]
    dpi: Option<f64>,

    /// Summed field level at which a sample counts as inside a blob
    #[arg(long, default_value_t = DEFAULT_MASK_THRESHOLD)]
    threshold: f64,

    /// Marker area in points²
    #[arg(long, default_value_t = DEFAULT_MARKER_SIZE)]
    marker_size: f64,

    /// Lines to skip between rendered frames
    #[arg(long, default_value_t = 0)]
    frameskip: usize,

    /// Timeline file, one record per line
    infile: PathBuf,

    /// Existing directory for the frames
    outdir: PathBuf,
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("invalid render settings"))]
    Config { source: ConfigError },

    #[snafu(display("rendering failed"))]
    Render { source: RenderError },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn render(args: RenderArgs) -> Result<(), CliError> {
    let mut config = RenderConfig::new(args.width, args.height).context(ConfigSnafu)?;
    if let Some(dpi) = args.dpi {
        config = config.with_dpi(dpi).context(ConfigSnafu)?;
    }
    config.threshold = args.threshold;
    config.marker_size = args.marker_size;

    let summary = metaballs::render_frames(&args.infile, &args.outdir, &config, args.frameskip)
        .context(RenderSnafu)?;
    info!(
        frames = summary.frames_written,
        outdir = %args.outdir.display(),
        "wrote frames"
    );
    Ok(())
}

#[snafu::report]
fn main() -> Result<(), CliError> {
    init_tracing();
    match Cli::parse().command {
        Command::RenderFrames(args) => render(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> RenderArgs {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        let Command::RenderFrames(args) = cli.command;
        args
    }

    #[test]
    fn render_frames_with_defaults() {
        let args = parse(&[
            "metaballs",
            "render_frames",
            "--width",
            "320",
            "--height",
            "180",
            "positions.txt",
            "frames",
        ]);
        assert_eq!((args.width, args.height), (320, 180));
        assert_eq!(args.infile, PathBuf::from("positions.txt"));
        assert_eq!(args.outdir, PathBuf::from("frames"));
        assert_eq!(args.dpi, None);
        assert_eq!(args.threshold, DEFAULT_MASK_THRESHOLD);
        assert_eq!(args.marker_size, DEFAULT_MARKER_SIZE);
        assert_eq!(args.frameskip, 0);
    }

    #[test]
    fn dashed_alias_and_short_flags() {
        let args = parse(&[
            "metaballs",
            "render-frames",
            "-x",
            "16",
            "-y",
            "9",
            "--dpi",
            "100",
            "--threshold",
            "0.25",
            "--marker-size",
            "50",
            "--frameskip",
            "3",
            "in.txt",
            "out",
        ]);
        assert_eq!((args.width, args.height), (16, 9));
        assert_eq!(args.dpi, Some(100.0));
        assert_eq!(args.threshold, 0.25);
        assert_eq!(args.marker_size, 50.0);
        assert_eq!(args.frameskip, 3);
    }

    #[test]
    fn width_is_required() {
        let err =
            Cli::try_parse_from(["metaballs", "render_frames", "-y", "9", "in.txt", "out"])
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
