use crate::field::{Extent, Kernel};
use crate::parse::SpaceTransform;
use crate::{
    DEFAULT_ASPECT_HEIGHT, DEFAULT_ASPECT_WIDTH, DEFAULT_CELL_COLOR, DEFAULT_COLOR_HEADROOM,
    DEFAULT_MARKER_SIZE, DEFAULT_MASK_THRESHOLD, DEFAULT_MUTANT_COLOR,
};
use rgb::RGB8;
use snafu::prelude::*;

// Typographic points per inch, the unit of marker sizes.
const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Snafu, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("frame size must be positive, got {width}x{height}"))]
    ZeroSize { width: u32, height: u32 },

    #[snafu(display("dpi must be a positive number, got {dpi}"))]
    InvalidDpi { dpi: f64 },
}

/// Physical size of the output figure, in inches.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aspect {
    pub width: f64,
    pub height: f64,
}

impl Default for Aspect {
    fn default() -> Self {
        Self {
            width: DEFAULT_ASPECT_WIDTH,
            height: DEFAULT_ASPECT_HEIGHT,
        }
    }
}

/// Everything that shapes a rendered frame.
///
/// The field is sampled on a `grid_width × grid_height` grid and drawn onto a
/// `canvas_width × canvas_height` image. Both default to the same size, in which
/// case every grid sample maps to exactly one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub extent: Extent,
    pub transform: SpaceTransform,
    pub kernel: Kernel,
    pub threshold: f64,
    /// The colour scale tops out at `color_headroom * mask.max()`.
    pub color_headroom: f64,
    /// Marker area in points².
    pub marker_size: f64,
    pub aspect: Aspect,
    pub cell_color: RGB8,
    pub mutant_color: RGB8,
}

impl RenderConfig {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        ensure!(width > 0 && height > 0, ZeroSizeSnafu { width, height });

        Ok(Self {
            grid_width: width,
            grid_height: height,
            canvas_width: width,
            canvas_height: height,
            extent: Extent::default(),
            transform: SpaceTransform::default(),
            kernel: Kernel::default(),
            threshold: DEFAULT_MASK_THRESHOLD,
            color_headroom: DEFAULT_COLOR_HEADROOM,
            marker_size: DEFAULT_MARKER_SIZE,
            aspect: Aspect::default(),
            cell_color: DEFAULT_CELL_COLOR,
            mutant_color: DEFAULT_MUTANT_COLOR,
        })
    }

    /// Size the canvas from the physical aspect, keeping the grid resolution.
    pub fn with_dpi(mut self, dpi: f64) -> Result<Self, ConfigError> {
        ensure!(dpi.is_finite() && dpi > 0.0, InvalidDpiSnafu { dpi });

        let width = (self.aspect.width * dpi).round() as u32;
        let height = (self.aspect.height * dpi).round() as u32;
        ensure!(width > 0 && height > 0, ZeroSizeSnafu { width, height });

        self.canvas_width = width;
        self.canvas_height = height;
        Ok(self)
    }

    /// Marker radius in canvas pixels.
    ///
    /// `marker_size` is an area in points², so the diameter is its square root.
    /// The canvas spans `aspect.width` inches horizontally.
    pub fn marker_radius(&self) -> f64 {
        let pixels_per_point = self.canvas_width as f64 / (self.aspect.width * POINTS_PER_INCH);
        self.marker_size.sqrt() / 2.0 * pixels_per_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = RenderConfig::new(320, 180).unwrap();
        assert_eq!(config.canvas_width, 320);
        assert_eq!(config.canvas_height, 180);
        assert_eq!(config.extent, Extent::centered(16.0, 9.0));
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.kernel.exponent, 4);
        assert_eq!(config.kernel.offset, 0.6);
        assert_eq!(config.transform.scale, 20.0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            RenderConfig::new(0, 10).unwrap_err(),
            ConfigError::ZeroSize {
                width: 0,
                height: 10
            }
        );
        assert!(RenderConfig::new(10, 0).is_err());
    }

    #[test]
    fn dpi_sets_canvas_only() {
        let config = RenderConfig::new(64, 36).unwrap().with_dpi(100.0).unwrap();
        assert_eq!((config.canvas_width, config.canvas_height), (1600, 900));
        assert_eq!((config.grid_width, config.grid_height), (64, 36));
    }

    #[test]
    fn invalid_dpi() {
        let config = RenderConfig::new(64, 36).unwrap();
        assert!(config.clone().with_dpi(0.0).is_err());
        assert!(config.clone().with_dpi(f64::NAN).is_err());
        assert!(config.with_dpi(0.01).is_err());
    }

    #[test]
    fn marker_radius_scales_with_canvas() {
        let small = RenderConfig::new(800, 450).unwrap();
        let large = RenderConfig::new(1600, 900).unwrap();
        assert!((large.marker_radius() - 2.0 * small.marker_radius()).abs() < 1e-12);
        // 200 pt² at 100 px per inch
        let expected = 200f64.sqrt() / 2.0 * 100.0 / 72.0;
        assert!((large.marker_radius() - expected).abs() < 1e-12);
    }
}
