//! Conversion options.
//!
//! Every tunable number the engine uses is a field here, with its default
//! exposed as a named constant.

use std::fmt;

use glam::DVec2;
use serde::Serialize;

/// Cell size used when the scene declares none.
pub const DEFAULT_PIXELS_PER_GRID: f64 = 140.0;
/// Relative height discrepancy tolerated by the bounding-box fit.
pub const DEFAULT_ASPECT_RATIO_TOLERANCE: f64 = 1e-3;
/// Added to the furthest vertex before rounding the map size up.
pub const DEFAULT_MAP_SIZE_EPSILON: f64 = 1e-6;

/// How the pixel-to-grid transform is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Trust the scene's padding, background and grid-shift fields.
    #[default]
    DeclaredOffset,
    /// Ignore declared offsets and fit the wall bounding box to an image size.
    BoundingBoxFit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DeclaredOffset => write!(f, "declared-offset"),
            Strategy::BoundingBoxFit => write!(f, "bounding-box-fit"),
        }
    }
}

/// Which JSON records qualify as a scene when scanning a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenePredicate {
    /// Any object with a `walls` key.
    #[default]
    HasWalls,
    /// Also requires `width`, `height`, `grid.size` and `background.src`.
    Strict,
}

impl fmt::Display for ScenePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenePredicate::HasWalls => write!(f, "a JSON object with a `walls` key"),
            ScenePredicate::Strict => write!(
                f,
                "a JSON object with `width`, `height`, `grid.size`, `background.src` and `walls`"
            ),
        }
    }
}

/// Order in which the declared offset components are summed.
///
/// There is one policy. It is named so summaries and tests can state which
/// rule produced an offset; it is not meant to vary at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetComposition {
    /// `padding + background shift + grid shift`
    #[default]
    PaddingBackgroundGrid,
}

impl fmt::Display for OffsetComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetComposition::PaddingBackgroundGrid => write!(f, "padding + background + grid"),
        }
    }
}

/// Options for a single conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub strategy: Strategy,
    pub scene_predicate: ScenePredicate,
    /// Used when the scene has no usable `grid` / `grid.size`.
    pub default_pixels_per_grid: f64,
    pub offset_composition: OffsetComposition,
    /// Grow `map_size` so every emitted vertex lies inside it.
    pub expand_map_size: bool,
    pub map_size_epsilon: f64,
    /// Bounding-box fit only.
    pub aspect_ratio_tolerance: f64,
    /// Bounding-box fit only; falls back to the scene width.
    pub target_image_width: Option<u32>,
    /// Bounding-box fit only; falls back to the scene height.
    pub target_image_height: Option<u32>,
    /// Grid-unit shift added after the main transform. Some renderers need
    /// a constant nudge; leave at zero unless one is known to be required.
    pub correction_offset: DVec2,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            scene_predicate: ScenePredicate::default(),
            default_pixels_per_grid: DEFAULT_PIXELS_PER_GRID,
            offset_composition: OffsetComposition::default(),
            expand_map_size: true,
            map_size_epsilon: DEFAULT_MAP_SIZE_EPSILON,
            aspect_ratio_tolerance: DEFAULT_ASPECT_RATIO_TOLERANCE,
            target_image_width: None,
            target_image_height: None,
            correction_offset: DVec2::ZERO,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_scene_predicate(mut self, predicate: ScenePredicate) -> Self {
        self.scene_predicate = predicate;
        self
    }

    pub fn with_default_pixels_per_grid(mut self, px: f64) -> Self {
        self.default_pixels_per_grid = px;
        self
    }

    pub fn with_expand_map_size(mut self, expand: bool) -> Self {
        self.expand_map_size = expand;
        self
    }

    pub fn with_aspect_ratio_tolerance(mut self, tolerance: f64) -> Self {
        self.aspect_ratio_tolerance = tolerance;
        self
    }

    pub fn with_target_image_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.target_image_width = width;
        self.target_image_height = height;
        self
    }

    pub fn with_correction_offset(mut self, offset: DVec2) -> Self {
        self.correction_offset = offset;
        self
    }
}
