mod config;
#[cfg(feature = "_debug")]
pub mod field;
#[cfg(not(feature = "_debug"))]
mod field;
#[cfg(feature = "_debug")]
pub mod parse;
#[cfg(not(feature = "_debug"))]
mod parse;
#[cfg(feature = "_debug")]
pub mod raster;
#[cfg(not(feature = "_debug"))]
mod raster;
#[cfg(feature = "_debug")]
pub mod rng;
#[cfg(all(test, not(feature = "_debug")))]
mod rng;
mod types;

pub use config::{Aspect, ConfigError, RenderConfig};
pub use field::{Extent, Grid, Kernel, Mask, ScalarField};
pub use image::RgbImage;
pub use parse::{ParseError, ScannedLine, SpaceTransform, TaggedPoint, parse_line, scan_line};
pub use rgb::RGB8;
pub use types::{FrameRecord, Point, Species};

use image::ImageFormat;
use snafu::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Half width of the plotted area, in plot units.
pub const DEFAULT_HORIZONTAL_EXTENT: f64 = 16.0;
/// Half height of the plotted area, in plot units.
pub const DEFAULT_VERTICAL_EXTENT: f64 = 9.0;
pub const DEFAULT_SPACE_BIAS: f64 = 0.25;
pub const DEFAULT_SPACE_SCALE: f64 = 20.0;
pub const DEFAULT_KERNEL_EXPONENT: i32 = 4;
pub const DEFAULT_KERNEL_OFFSET: f64 = 0.6;
pub const DEFAULT_MASK_THRESHOLD: f64 = 0.5;
/// Marker area in points².
pub const DEFAULT_MARKER_SIZE: f64 = 200.0;
/// Output figure size in inches.
pub const DEFAULT_ASPECT_WIDTH: f64 = 16.0;
pub const DEFAULT_ASPECT_HEIGHT: f64 = 9.0;
pub const DEFAULT_COLOR_HEADROOM: f64 = 5.0;
pub const DEFAULT_CELL_COLOR: RGB8 = RGB8 { r: 0, g: 128, b: 128 };
pub const DEFAULT_MUTANT_COLOR: RGB8 = RGB8 {
    r: 218,
    g: 165,
    b: 32,
};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RenderError {
    #[snafu(display("could not open {}", path.display()))]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("could not read line {line}"))]
    ReadLine {
        line: usize,
        source: std::io::Error,
    },

    #[snafu(display("output directory {} does not exist", path.display()))]
    MissingOutputDir { path: PathBuf },

    #[snafu(display("malformed record on line {line}"))]
    Parse { line: usize, source: ParseError },

    #[snafu(display("could not write {}", path.display()))]
    WriteFrame {
        path: PathBuf,
        source: image::ImageError,
    },
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub lines: usize,
    pub frames_written: usize,
}

/// `frame000000042.png` for line 42.
pub fn frame_file_name(index: usize) -> String {
    format!("frame{index:09}.png")
}

/// Threshold the summed kernel field of every point in the record.
pub fn frame_mask(record: &FrameRecord, config: &RenderConfig) -> Mask {
    let grid = Grid::new(
        &config.extent,
        config.grid_width as usize,
        config.grid_height as usize,
    );
    ScalarField::synthesize(&grid, &config.kernel, record.points()).threshold(config.threshold)
}

/// Render a record to an in-memory image.
///
/// ```
/// let config = metaballs::RenderConfig::new(64, 36).unwrap();
/// let record = metaballs::parse_line("0.5 A(0.0, 0.0) B(-0.3, -0.2)", &config.transform).unwrap();
/// assert_eq!(record.cells, vec![metaballs::Point::new(5.0, 5.0)]);
///
/// let img = metaballs::compose_frame(&record, &config);
/// assert_eq!(img.dimensions(), (64, 36));
/// ```
pub fn compose_frame(record: &FrameRecord, config: &RenderConfig) -> RgbImage {
    let mask = frame_mask(record, config);
    raster::compose(&mask, record, config)
}

/// Render a record and write it as a PNG to `path`.
pub fn render_frame(
    path: &Path,
    record: &FrameRecord,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let img = compose_frame(record, config);
    img.save_with_format(path, ImageFormat::Png)
        .context(WriteFrameSnafu { path })
}

/// Render one frame per line of `input` into `out_dir`.
///
/// Only every `frameskip + 1`-th line is drawn; frame files are always named
/// after the line index.
pub fn render_frames(
    input: &Path,
    out_dir: &Path,
    config: &RenderConfig,
    frameskip: usize,
) -> Result<RenderSummary, RenderError> {
    ensure!(out_dir.is_dir(), MissingOutputDirSnafu { path: out_dir });
    let file = File::open(input).context(OpenInputSnafu { path: input })?;
    info!(input = %input.display(), out_dir = %out_dir.display(), "rendering frames");
    render_lines(BufReader::new(file), out_dir, config, frameskip)
}

pub fn render_lines(
    reader: impl BufRead,
    out_dir: &Path,
    config: &RenderConfig,
    frameskip: usize,
) -> Result<RenderSummary, RenderError> {
    let stride = frameskip.saturating_add(1);
    let mut summary = RenderSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context(ReadLineSnafu { line: index + 1 })?;
        summary.lines += 1;
        if index % stride != 0 {
            continue;
        }

        let record =
            parse_line(&line, &config.transform).context(ParseSnafu { line: index + 1 })?;
        debug!(
            frame = index,
            time = ?record.time,
            cells = record.cells.len(),
            mutants = record.mutants.len(),
            "rendering frame"
        );

        let path = out_dir.join(frame_file_name(index));
        render_frame(&path, &record, config)?;
        summary.frames_written += 1;
    }

    info!(
        lines = summary.lines,
        frames = summary.frames_written,
        "finished rendering"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn small_config() -> RenderConfig {
        RenderConfig::new(96, 54).unwrap()
    }

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name(0), "frame000000000.png");
        assert_eq!(frame_file_name(42), "frame000000042.png");
        assert_eq!(frame_file_name(123_456_789), "frame123456789.png");
    }

    #[test]
    fn empty_record_renders_blank() {
        let config = small_config();
        let record = parse_line("", &config.transform).unwrap();
        let mask = frame_mask(&record, &config);
        assert_eq!(mask.max(), 0);
        assert_eq!(mask.values.len(), 96 * 54);

        let img = compose_frame(&record, &config);
        assert!(img.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn point_shows_mask_and_marker() {
        let mut config = small_config();
        // a few pixels across at this canvas size
        config.marker_size = 5000.0;
        // lands on (0, 0) after the transform
        let record = parse_line("A(-0.25, -0.25)", &config.transform).unwrap();
        let mask = frame_mask(&record, &config);
        assert!(mask.count_on() > 0);

        let img = compose_frame(&record, &config);
        let (cx, cy) = (48, 27);
        assert_eq!(img.get_pixel(cx, cy), &Rgb([0, 128, 128]));
        // far corner is background
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn mask_region_is_gray_outside_marker() {
        let mut config = small_config();
        config.marker_size = 0.0;
        let record = parse_line("B(-0.25, -0.25)", &config.transform).unwrap();
        let img = compose_frame(&record, &config);
        let mask = frame_mask(&record, &config);

        let gray = Rgb([204, 204, 204]);
        let on_pixels = img.pixels().filter(|p| **p == gray).count();
        assert_eq!(on_pixels, mask.count_on());
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = small_config();
        let record =
            parse_line("A(0.1, 0.2) B(-0.3, 0.1) A(0.4, -0.2)", &config.transform).unwrap();
        assert_eq!(frame_mask(&record, &config), frame_mask(&record, &config));
        assert_eq!(compose_frame(&record, &config), compose_frame(&record, &config));
    }

    #[test]
    fn one_file_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = "0 A(0.0, 0.0)\n1 \n2 A(0.1, 0.1) B(0.2, 0.2)\n";
        let summary = render_lines(Cursor::new(input), dir.path(), &small_config(), 0).unwrap();
        assert_eq!(
            summary,
            RenderSummary {
                lines: 3,
                frames_written: 3
            }
        );
        for index in 0..3 {
            assert!(dir.path().join(frame_file_name(index)).is_file());
        }
        assert!(!dir.path().join(frame_file_name(3)).exists());
    }

    #[test]
    fn frameskip_keeps_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let input = "A(0, 0)\n".repeat(5);
        let summary = render_lines(Cursor::new(input), dir.path(), &small_config(), 1).unwrap();
        assert_eq!(summary.frames_written, 3);
        for index in [0, 2, 4] {
            assert!(dir.path().join(frame_file_name(index)).is_file());
        }
        assert!(!dir.path().join(frame_file_name(1)).exists());
    }

    #[test]
    fn parse_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = "A(0, 0)\nA(1e, 0)\n";
        let err = render_lines(Cursor::new(input), dir.path(), &small_config(), 0).unwrap_err();
        assert!(matches!(err, RenderError::Parse { line: 2, .. }), "{err:?}");
        // the first frame is already on disk
        assert!(dir.path().join(frame_file_name(0)).is_file());
    }

    #[test]
    fn missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = render_frames(Path::new("whatever.txt"), &missing, &small_config(), 0)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
