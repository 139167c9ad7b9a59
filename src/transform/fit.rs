//! Bounding-box fit strategy.
//!
//! Ignores every declared offset. The wall bounding box is scaled by a single
//! gain so its X span fills the target image width exactly, its left edge is
//! pinned to pixel 0 and its bottom edge to the image bottom. If the box's
//! aspect ratio differs from the image's, the vertical fit is off and a
//! warning says by how much.

use glam::{DVec2, dvec2};
use serde::Serialize;

use crate::config::ConvertOptions;
use crate::errors::{ConvertError, Warning};
use crate::scene::Wall;
use crate::types::{Bounds, PixelsPerGrid};

use super::{Derivation, GridTransform, Plan};

/// Narrower boxes than this (in pixels) cannot yield a usable gain.
const MIN_SPAN: f64 = 1e-6;

/// Result of fitting the wall bounding box to the target image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitReport {
    /// Wall bounding box in canvas pixels
    pub bounds: Bounds,
    /// Target image size in pixels
    pub target: DVec2,
    pub gain: f64,
    pub offset: DVec2,
    /// Height the box occupies after scaling by `gain`
    pub implied_height: f64,
    /// `|implied_height − target.y| / target.y`
    pub relative_error: f64,
    pub within_tolerance: bool,
}

/// Bounding box of every wall endpoint. Walls with non-finite coordinates
/// are left out; they are dropped later by the classifier.
pub fn wall_bounds(walls: &[Wall]) -> Bounds {
    let mut bounds = Bounds::new();
    for wall in walls {
        if wall.start.is_finite() && wall.end.is_finite() {
            bounds.expand_point(wall.start);
            bounds.expand_point(wall.end);
        }
    }
    bounds
}

/// Fit `bounds` onto an image of `target` pixels.
pub fn fit(bounds: Bounds, target: DVec2, tolerance: f64) -> Result<FitReport, ConvertError> {
    let width = bounds.width();
    if width < MIN_SPAN {
        return Err(ConvertError::DegenerateBoundingBox { width });
    }

    let gain = target.x / width;
    let offset = dvec2(-bounds.min.x * gain, target.y - bounds.max.y * gain);

    let implied_height = bounds.height() * gain;
    let relative_error = (implied_height - target.y).abs() / target.y;

    Ok(FitReport {
        bounds,
        target,
        gain,
        offset,
        implied_height,
        relative_error,
        within_tolerance: relative_error <= tolerance,
    })
}

/// Target image size: explicit overrides, else the scene canvas.
pub fn target_size(canvas: DVec2, options: &ConvertOptions) -> DVec2 {
    let pick = |over: Option<u32>, fallback: f64| {
        over.filter(|&px| px > 0).map_or(fallback, f64::from)
    };
    dvec2(
        pick(options.target_image_width, canvas.x),
        pick(options.target_image_height, canvas.y),
    )
}

pub(super) fn plan(
    walls: &[Wall],
    canvas: DVec2,
    pixels_per_grid: PixelsPerGrid,
    options: &ConvertOptions,
) -> Result<Plan, ConvertError> {
    let target = target_size(canvas, options);
    let nominal_map_size = pixels_per_grid.to_grid(target);
    let bounds = wall_bounds(walls);

    if bounds.is_empty() {
        return Ok(Plan {
            transform: GridTransform::translate(DVec2::ZERO, pixels_per_grid),
            nominal_map_size,
            derivation: Derivation::Fit(None),
            warnings: vec![Warning::EmptyWallSet],
        });
    }

    let report = fit(bounds, target, options.aspect_ratio_tolerance)?;

    crate::log::debug!(
        min_x = bounds.min.x,
        min_y = bounds.min.y,
        max_x = bounds.max.x,
        max_y = bounds.max.y,
        gain = report.gain,
        offset_x = report.offset.x,
        offset_y = report.offset.y,
        relative_error = report.relative_error,
        "bounding-box fit"
    );

    let mut warnings = Vec::new();
    if !report.within_tolerance {
        warnings.push(Warning::AspectRatioMismatch {
            implied_height: report.implied_height,
            target_height: target.y,
            relative_error: report.relative_error,
        });
    }

    Ok(Plan {
        transform: GridTransform {
            gain: report.gain,
            offset: report.offset,
            pixels_per_grid,
            correction: DVec2::ZERO,
        },
        nominal_map_size,
        derivation: Derivation::Fit(Some(report)),
        warnings,
    })
}
