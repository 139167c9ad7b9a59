//! Pixel → grid transforms
//!
//! This module is organized into submodules:
//! - `declared`: offsets taken from the scene's padding, background and grid fields
//! - `fit`: isotropic fit of the wall bounding box onto a target image
//!
//! Both strategies reduce to one [`GridTransform`], so the wall classifier
//! never needs to know which strategy produced it.

pub mod declared;
pub mod fit;

use glam::DVec2;

use crate::config::{ConvertOptions, Strategy};
use crate::errors::{ConvertError, Warning};
use crate::scene::{Scene, Wall};
use crate::types::PixelsPerGrid;

pub use declared::DeclaredOffsets;
pub use fit::FitReport;

/// Affine map from canvas pixels to grid units:
/// `(gain · p + offset) / pixels_per_grid + correction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub gain: f64,
    /// Pixel-space translation applied after scaling by `gain`
    pub offset: DVec2,
    pub pixels_per_grid: PixelsPerGrid,
    /// Grid-unit shift applied last
    pub correction: DVec2,
}

impl GridTransform {
    /// Plain translate-then-scale with unit gain.
    pub fn translate(offset: DVec2, pixels_per_grid: PixelsPerGrid) -> Self {
        GridTransform {
            gain: 1.0,
            offset,
            pixels_per_grid,
            correction: DVec2::ZERO,
        }
    }

    pub fn with_correction(mut self, correction: DVec2) -> Self {
        self.correction = correction;
        self
    }

    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.pixels_per_grid.to_grid(self.gain * p + self.offset) + self.correction
    }
}

/// How the transform was derived, for the summary
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    Declared(DeclaredOffsets),
    /// `None` when there were no walls to fit.
    Fit(Option<FitReport>),
}

/// Everything a strategy decides before walls are classified
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub transform: GridTransform,
    /// Map size in grid units before any expansion
    pub nominal_map_size: DVec2,
    pub derivation: Derivation,
    pub warnings: Vec<Warning>,
}

/// Run the configured strategy.
pub fn plan(
    scene: &Scene,
    canvas: DVec2,
    walls: &[Wall],
    options: &ConvertOptions,
) -> Result<Plan, ConvertError> {
    let pixels_per_grid = scene.pixels_per_grid(options.default_pixels_per_grid)?;
    let mut plan = match options.strategy {
        Strategy::DeclaredOffset => declared::plan(scene, canvas, pixels_per_grid, options),
        Strategy::BoundingBoxFit => fit::plan(walls, canvas, pixels_per_grid, options)?,
    };
    plan.transform = plan.transform.with_correction(options.correction_offset);
    Ok(plan)
}
