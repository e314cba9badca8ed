//! Drawing a mask and its point markers onto an RGB canvas.

use crate::config::RenderConfig;
use crate::field::{Extent, Mask};
use crate::types::{FrameRecord, Point};
use image::{Rgb, RgbImage};
use rgb::RGB8;

// Entries in the grayscale lookup table
const LUT_SIZE: usize = 256;

/// Linear colour scale mapping `[vmin, vmax]` onto a white-to-black ramp.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn for_mask(mask: &Mask, headroom: f64) -> Self {
        Self {
            vmin: mask.min() as f64,
            vmax: mask.max() as f64 * headroom,
        }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`. A flat scale maps to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    /// Gray level through a 256-entry white-to-black table.
    pub fn gray(&self, value: f64) -> u8 {
        let index = ((self.normalize(value) * LUT_SIZE as f64) as usize).min(LUT_SIZE - 1);
        (LUT_SIZE - 1 - index) as u8
    }
}

/// Maps extent coordinates to continuous canvas coordinates, y pointing down.
#[derive(Debug, Copy, Clone)]
pub struct Viewport {
    pub extent: Extent,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn to_canvas(&self, point: Point) -> (f64, f64) {
        let x = (point.x - self.extent.x_min) / self.extent.width() * self.width as f64;
        let y = (self.extent.y_max - point.y) / self.extent.height() * self.height as f64;
        (x, y)
    }
}

// Source sample coordinate and weight for canvas pixel `i` of `n`, over `samples` grid points.
#[inline]
fn source_position(i: u32, n: u32, samples: usize) -> (usize, usize, f64) {
    let s = ((i as f64 + 0.5) * samples as f64 / n as f64 - 0.5).clamp(0.0, (samples - 1) as f64);
    let lo = s.floor() as usize;
    let hi = (lo + 1).min(samples - 1);
    (lo, hi, s - lo as f64)
}

/// Stretch the mask over a `width × height` canvas with bilinear interpolation.
///
/// Returns rows top to bottom; the mask's row 0 ends up at the bottom.
pub fn resample_bilinear(mask: &Mask, width: u32, height: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(width as usize * height as usize);
    if mask.width == 0 || mask.height == 0 {
        out.resize(width as usize * height as usize, 0.0);
        return out;
    }

    let columns: Vec<_> = (0..width)
        .map(|px| source_position(px, width, mask.width))
        .collect();

    for py in 0..height {
        let (y0, y1, ty) = source_position(height - 1 - py, height, mask.height);
        for &(x0, x1, tx) in &columns {
            let top = lerp(mask.get(x0, y1) as f64, mask.get(x1, y1) as f64, tx);
            let bottom = lerp(mask.get(x0, y0) as f64, mask.get(x1, y0) as f64, tx);
            out.push(lerp(bottom, top, ty));
        }
    }
    out
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Fill the whole canvas with the interpolated mask.
pub fn paint_mask(img: &mut RgbImage, mask: &Mask, scale: &ColorScale) {
    let samples = resample_bilinear(mask, img.width(), img.height());
    for (pixel, value) in img.pixels_mut().zip(samples) {
        let g = scale.gray(value);
        *pixel = Rgb([g, g, g]);
    }
}

/// Anti-aliased filled disc, blended in linear light.
// Not imageproc's draw_filled_circle_mut, which has hard edges and no linear-light blending.
pub fn draw_marker(img: &mut RgbImage, center: (f64, f64), radius: f64, color: RGB8) {
    if radius <= 0.0 {
        return;
    }
    let (cx, cy) = center;
    let reach = radius + 0.5;
    let x_start = (cx - reach).floor().max(0.0) as u32;
    let y_start = (cy - reach).floor().max(0.0) as u32;
    let x_end = ((cx + reach).ceil().max(0.0) as u32).min(img.width());
    let y_end = ((cy + reach).ceil().max(0.0) as u32).min(img.height());

    let fg = [
        fast_srgb8::srgb8_to_f32(color.r),
        fast_srgb8::srgb8_to_f32(color.g),
        fast_srgb8::srgb8_to_f32(color.b),
    ];

    for y in y_start..y_end {
        for x in x_start..x_end {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let coverage = (reach - dx.hypot(dy)).clamp(0.0, 1.0) as f32;
            if coverage <= 0.0 {
                continue;
            }

            let pixel = img.get_pixel_mut(x, y);
            for (channel, &target) in pixel.0.iter_mut().zip(&fg) {
                let bg = fast_srgb8::srgb8_to_f32(*channel);
                *channel = fast_srgb8::f32_to_srgb8(bg + (target - bg) * coverage);
            }
        }
    }
}

/// Draw the mask, then cell markers, then mutant markers.
pub fn compose(mask: &Mask, record: &FrameRecord, config: &RenderConfig) -> RgbImage {
    let mut img = RgbImage::new(config.canvas_width, config.canvas_height);
    let scale = ColorScale::for_mask(mask, config.color_headroom);
    paint_mask(&mut img, mask, &scale);

    let viewport = Viewport {
        extent: config.extent,
        width: config.canvas_width,
        height: config.canvas_height,
    };
    let radius = config.marker_radius();
    for &point in &record.cells {
        draw_marker(&mut img, viewport.to_canvas(point), radius, config.cell_color);
    }
    for &point in &record.mutants {
        draw_marker(&mut img, viewport.to_canvas(point), radius, config.mutant_color);
    }

    img
}
