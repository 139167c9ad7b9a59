//! Convert tabletop scene exports into Universal VTT documents.
//!
//! A scene describes a pixel canvas, a square grid and a set of wall
//! segments. The Universal VTT format wants the same walls in grid units,
//! positioned so the renderer's grid lines fall where the author's did.
//! Two strategies derive the pixel → grid transform (see [`Strategy`]); both
//! feed the same wall/door classifier.
//!
//! ```no_run
//! use uvtt_convert::{ConvertOptions, convert_str};
//!
//! let text = std::fs::read_to_string("scenes.db")?;
//! let conversion = convert_str(&text, &ConvertOptions::default())?;
//! eprintln!("{}", conversion.summary);
//! println!("{}", conversion.document.to_json_pretty()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
pub mod config;
pub mod document;
pub mod errors;
pub mod locate;
pub mod log;
pub mod scene;
pub mod summary;
pub mod transform;
pub mod types;

use glam::DVec2;

pub use config::{ConvertOptions, OffsetComposition, ScenePredicate, Strategy};
pub use document::{GridPoint, Portal, Resolution, UvttDocument};
pub use errors::{ConvertError, Warning};
pub use locate::{Located, find_scene, locate};
pub use scene::{Scene, Wall};
pub use summary::ConversionSummary;
pub use transform::GridTransform;

use transform::Derivation;

/// The result of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub document: UvttDocument,
    pub summary: ConversionSummary,
}

/// Locate the scene in a line-delimited container and convert it.
pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let (line, scene) = find_scene(text, options.scene_predicate)?;
    let mut conversion = convert_scene(&scene, options)?;
    conversion.summary.scene_line = Some(line);
    Ok(conversion)
}

/// Convert an already decoded scene.
///
/// Fails only on problems that make the whole scene unusable; individual bad
/// walls are dropped and listed in the summary.
pub fn convert_scene(scene: &Scene, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let canvas = scene.validate()?;
    let (walls, mut warnings) = scene.walls();

    let plan = transform::plan(scene, canvas, &walls, options)?;
    let classified = classify::classify(&walls, &plan.transform);

    let map_size = if options.expand_map_size {
        expand_map_size(plan.nominal_map_size, classified.furthest, options.map_size_epsilon)
    } else {
        plan.nominal_map_size
    };

    let skipped = warnings.len() + classified.skipped();
    warnings.extend(plan.warnings);
    warnings.extend(classified.warnings);
    for w in &warnings {
        crate::log::warn!("{w}");
    }

    let pixels_per_grid = plan.transform.pixels_per_grid.raw();
    let (offsets, fit) = match plan.derivation {
        Derivation::Declared(offsets) => (Some(offsets), None),
        Derivation::Fit(report) => (None, report),
    };

    let document = UvttDocument {
        format: document::FORMAT_VERSION,
        resolution: Resolution {
            map_origin: GridPoint::default(),
            map_size: map_size.into(),
            pixels_per_grid,
        },
        image: scene.image().to_owned(),
        line_of_sight: classified.line_of_sight,
        portals: classified.portals,
    };

    let summary = ConversionSummary {
        strategy: options.strategy,
        scene_line: None,
        scene_name: scene.name.clone(),
        canvas,
        pixels_per_grid,
        offsets,
        fit,
        correction: plan.transform.correction,
        furthest_vertex: classified.furthest,
        nominal_map_size: plan.nominal_map_size,
        map_size,
        line_of_sight: document.line_of_sight.len(),
        portals: document.portals.len(),
        skipped,
        warnings,
    };

    Ok(Conversion { document, summary })
}

/// Grow each axis that some vertex overruns to the next whole cell past it.
fn expand_map_size(nominal: DVec2, furthest: DVec2, epsilon: f64) -> DVec2 {
    let grow = |nominal: f64, furthest: f64| {
        if furthest > nominal {
            (furthest + epsilon).ceil()
        } else {
            nominal
        }
    };
    DVec2::new(grow(nominal.x, furthest.x), grow(nominal.y, furthest.y))
}
