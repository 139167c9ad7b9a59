//! Declared-offset strategy.
//!
//! The scene says where its content sits: a padding border around the
//! canvas, a background image whose centre may be moved off the canvas
//! centre, and a grid origin shift. Their sum is the pixel translation that
//! puts grid lines back on the walls. Getting any term wrong moves every
//! wall by the same amount, so each term is reported separately.

use glam::DVec2;
use serde::Serialize;

use crate::config::{ConvertOptions, OffsetComposition};
use crate::errors::Warning;
use crate::scene::Scene;
use crate::types::PixelsPerGrid;

use super::{Derivation, GridTransform, Plan};

/// Offset components in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeclaredOffsets {
    pub composition: OffsetComposition,
    pub padding: DVec2,
    pub background: DVec2,
    pub grid: DVec2,
    pub total: DVec2,
}

impl DeclaredOffsets {
    /// Resolve every component for `scene` and compose them.
    pub fn resolve(
        scene: &Scene,
        canvas: DVec2,
        composition: OffsetComposition,
    ) -> (DeclaredOffsets, Option<Warning>) {
        let (padding, warning) = padding_offset(scene.padding, canvas);
        let background = background_shift(scene, canvas);
        let grid = scene.grid_shift();
        let total = match composition {
            OffsetComposition::PaddingBackgroundGrid => padding + background + grid,
        };
        let offsets = DeclaredOffsets {
            composition,
            padding,
            background,
            grid,
            total,
        };
        (offsets, warning)
    }
}

/// `padding × canvas`, or zero when the fraction is absent, zero, or outside
/// `(0, 0.5)`. Out-of-range values also produce a warning.
fn padding_offset(fraction: Option<f64>, canvas: DVec2) -> (DVec2, Option<Warning>) {
    match fraction {
        None => (DVec2::ZERO, None),
        Some(p) if p == 0.0 => (DVec2::ZERO, None),
        Some(p) if p > 0.0 && p < 0.5 => (canvas * p, None),
        Some(value) => (DVec2::ZERO, Some(Warning::DegeneratePadding { value })),
    }
}

/// How far the background centre sits from the canvas centre.
fn background_shift(scene: &Scene, canvas: DVec2) -> DVec2 {
    let Some(bg) = &scene.background else {
        return DVec2::ZERO;
    };
    let half = canvas / 2.0;
    let centre = DVec2::new(bg.x.unwrap_or(half.x), bg.y.unwrap_or(half.y));
    centre - half
}

pub(super) fn plan(
    scene: &Scene,
    canvas: DVec2,
    pixels_per_grid: PixelsPerGrid,
    options: &ConvertOptions,
) -> Plan {
    let (offsets, warning) = DeclaredOffsets::resolve(scene, canvas, options.offset_composition);

    crate::log::debug!(
        padding_x = offsets.padding.x,
        padding_y = offsets.padding.y,
        background_x = offsets.background.x,
        background_y = offsets.background.y,
        grid_x = offsets.grid.x,
        grid_y = offsets.grid.y,
        total_x = offsets.total.x,
        total_y = offsets.total.y,
        pixels_per_grid = pixels_per_grid.raw(),
        "declared offsets"
    );

    Plan {
        transform: GridTransform::translate(-offsets.total, pixels_per_grid),
        nominal_map_size: pixels_per_grid.to_grid(canvas),
        derivation: Derivation::Declared(offsets),
        warnings: warning.into_iter().collect(),
    }
}
