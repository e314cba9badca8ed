use crate::types::Point;
use crate::{
    DEFAULT_HORIZONTAL_EXTENT, DEFAULT_KERNEL_EXPONENT, DEFAULT_KERNEL_OFFSET,
    DEFAULT_VERTICAL_EXTENT,
};

// exp(-x) is exactly 0.0 in f64 for any x above ~745.2
const EXP_UNDERFLOW: f64 = 750.0;

/// Physical rectangle covered by every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self::centered(DEFAULT_HORIZONTAL_EXTENT, DEFAULT_VERTICAL_EXTENT)
    }
}

impl Extent {
    pub const fn centered(half_width: f64, half_height: f64) -> Self {
        Self {
            x_min: -half_width,
            x_max: half_width,
            y_min: -half_height,
            y_max: half_height,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Radial bump `exp(-(d² + offset)^exponent)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Kernel {
    pub offset: f64,
    pub exponent: i32,
}

impl Default for Kernel {
    fn default() -> Self {
        Self {
            offset: DEFAULT_KERNEL_OFFSET,
            exponent: DEFAULT_KERNEL_EXPONENT,
        }
    }
}

impl Kernel {
    #[inline]
    pub fn eval(&self, squared_distance: f64) -> f64 {
        (-(squared_distance + self.offset).powi(self.exponent)).exp()
    }

    /// Value at the center of a point.
    pub fn peak(&self) -> f64 {
        self.eval(0.0)
    }

    /// Squared distance beyond which the kernel evaluates to exactly zero.
    ///
    /// Only defined when the inner term grows with distance.
    fn cutoff(&self) -> Option<f64> {
        if self.offset < 0.0 || self.exponent <= 0 {
            return None;
        }
        Some(EXP_UNDERFLOW.powf(1.0 / self.exponent as f64) - self.offset)
    }
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = end;
            values
        }
    }
}

/// Sample coordinates of the field. The 2D grid is the outer product of the two axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Grid {
    pub fn new(extent: &Extent, width: usize, height: usize) -> Self {
        Self {
            xs: linspace(extent.x_min, extent.x_max, width),
            ys: linspace(extent.y_min, extent.y_max, height),
        }
    }

    pub fn width(&self) -> usize {
        self.xs.len()
    }

    pub fn height(&self) -> usize {
        self.ys.len()
    }
}

/// Row-major field samples. Row 0 lies at `y_min`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl ScalarField {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Sum one kernel per point over the grid.
    pub fn synthesize(
        grid: &Grid,
        kernel: &Kernel,
        points: impl IntoIterator<Item = Point>,
    ) -> Self {
        let mut field = Self::zeros(grid.width(), grid.height());
        for point in points {
            field.accumulate(grid, kernel, point);
        }
        field
    }

    /// Add the contribution of a single point.
    pub fn accumulate(&mut self, grid: &Grid, kernel: &Kernel, point: Point) {
        if self.width == 0 {
            return;
        }
        let cutoff = kernel.cutoff().unwrap_or(f64::INFINITY);

        for (row, &y) in self.values.chunks_exact_mut(self.width).zip(&grid.ys) {
            let dy = y - point.y;
            if dy * dy > cutoff {
                continue;
            }
            for (value, &x) in row.iter_mut().zip(&grid.xs) {
                let d2 = point.squared_distance(x, y);
                if d2 > cutoff {
                    continue;
                }
                *value += kernel.eval(d2);
            }
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Values below `level` become 0, everything still positive becomes 1.
    pub fn threshold(&self, level: f64) -> Mask {
        let values = self
            .values
            .iter()
            .map(|&v| {
                let v = if v < level { 0.0 } else { v };
                u8::from(v > 0.0)
            })
            .collect();
        Mask {
            width: self.width,
            height: self.height,
            values,
        }
    }
}

/// Binary field, every value is 0 or 1. Same layout as [`ScalarField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub values: Vec<u8>,
}

impl Mask {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.values[y * self.width + x]
    }

    pub fn min(&self) -> u8 {
        self.values.iter().copied().min().unwrap_or(0)
    }

    pub fn max(&self) -> u8 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn count_on(&self) -> usize {
        self.values.iter().filter(|&&v| v == 1).count()
    }
}
