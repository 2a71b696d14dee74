//! Per-pixel scalar fields (boundary strength, stiffness).

use mallea_math::DVec2;
use mallea_types::{WarpError, WarpResult};

/// A row-major grid of scalar samples aligned with image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ScalarField {
    /// Wraps `data` (length `width × height`).
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> WarpResult<Self> {
        if width == 0 || height == 0 {
            return Err(WarpError::InvalidConfig("field must be non-empty".into()));
        }
        if data.len() != width * height {
            return Err(WarpError::DimensionMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a field by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> WarpResult<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    /// A field with the same value everywhere.
    pub fn constant(width: usize, height: usize, value: f32) -> WarpResult<Self> {
        Self::new(width, height, vec![value; width * height])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at pixel `(x, y)`, clamped to the field bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.data[y * self.width + x]
    }

    /// Bilinear sample at image coordinates `p`; outside points clamp to the edge.
    pub fn sample(&self, p: DVec2) -> f64 {
        let x = p.x.clamp(0.0, (self.width - 1) as f64);
        let y = p.y.clamp(0.0, (self.height - 1) as f64);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let tx = x - x0 as f64;
        let ty = y - y0 as f64;

        let v00 = self.at(x0, y0) as f64;
        let v10 = self.at(x0 + 1, y0) as f64;
        let v01 = self.at(x0, y0 + 1) as f64;
        let v11 = self.at(x0 + 1, y0 + 1) as f64;

        let top = v00 + (v10 - v00) * tx;
        let bottom = v01 + (v11 - v01) * tx;
        top + (bottom - top) * ty
    }

    /// Checks the field covers an image of the given size (±1 pixel).
    pub fn check_aligned(&self, width: f64, height: f64) -> WarpResult<()> {
        let w = width.round() as usize;
        let h = height.round() as usize;
        if self.width.abs_diff(w) > 1 {
            return Err(WarpError::DimensionMismatch {
                expected: w,
                actual: self.width,
            });
        }
        if self.height.abs_diff(h) > 1 {
            return Err(WarpError::DimensionMismatch {
                expected: h,
                actual: self.height,
            });
        }
        Ok(())
    }
}
