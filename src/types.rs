//! Small validated numeric primitives shared by both transform strategies.

use std::fmt;

use glam::DVec2;
use serde::Serialize;
use thiserror::Error;

/// Why a scene dimension or cell size was rejected.
///
/// The messages read as the tail of a sentence naming the field, e.g.
/// "`width` must be greater than zero".
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NumericError {
    #[error("is not a number")]
    NaN,
    #[error("is infinite")]
    Infinite,
    #[error("must be greater than zero")]
    Zero,
    #[error("must be positive, got {0}")]
    Negative(f64),
}

/// Check that a value is finite and strictly positive.
pub fn positive(val: f64) -> Result<f64, NumericError> {
    match val {
        v if v.is_nan() => Err(NumericError::NaN),
        v if v.is_infinite() => Err(NumericError::Infinite),
        v if v == 0.0 => Err(NumericError::Zero),
        v if v < 0.0 => Err(NumericError::Negative(v)),
        v => Ok(v),
    }
}

/// Source pixels per target grid cell.
///
/// Only constructible through [`PixelsPerGrid::try_new`], so every division
/// by the cell size is guaranteed to be by a finite positive number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelsPerGrid(f64);

impl PixelsPerGrid {
    /// Create a cell size with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(px: f64) -> Result<Self, NumericError> {
        positive(px).map(PixelsPerGrid)
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Convert a pixel-space point to grid units.
    #[inline]
    pub fn to_grid(self, p: DVec2) -> DVec2 {
        p / self.0
    }
}

impl fmt::Display for PixelsPerGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned bounding box over pixel or grid points
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        Bounds {
            min: DVec2::splat(f64::MAX),
            max: DVec2::splat(f64::MIN),
        }
    }

    /// Check if the box is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
