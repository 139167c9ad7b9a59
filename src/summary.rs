//! Conversion summary.
//!
//! A misaligned offset is invisible in the output JSON, so every number that
//! went into the transform is reported here, along with what was emitted
//! and what was dropped.

use std::fmt;

use glam::DVec2;
use serde::Serialize;

use crate::config::Strategy;
use crate::errors::Warning;
use crate::transform::{DeclaredOffsets, FitReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    pub strategy: Strategy,
    /// Line of the container the scene came from, when located from text
    pub scene_line: Option<usize>,
    pub scene_name: Option<String>,
    /// Canvas size in pixels
    pub canvas: DVec2,
    pub pixels_per_grid: f64,
    /// Declared-offset strategy only
    pub offsets: Option<DeclaredOffsets>,
    /// Bounding-box fit only; `None` there when no walls could be fitted
    pub fit: Option<FitReport>,
    /// Grid-unit correction applied after the transform
    pub correction: DVec2,
    /// Largest emitted grid coordinate on each axis
    pub furthest_vertex: DVec2,
    pub nominal_map_size: DVec2,
    pub map_size: DVec2,
    pub line_of_sight: usize,
    pub portals: usize,
    pub skipped: usize,
    pub warnings: Vec<Warning>,
}

fn pair(v: DVec2) -> String {
    format!("({}, {})", v.x, v.y)
}

fn size(v: DVec2) -> String {
    format!("{} x {}", v.x, v.y)
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! row {
            ($label:expr, $($arg:tt)*) => {
                writeln!(f, "{:<18}: {}", $label, format_args!($($arg)*))?
            };
        }

        row!("strategy", "{}", self.strategy);
        match (&self.scene_name, self.scene_line) {
            (Some(name), Some(line)) => row!("scene", "{name} (line {line})"),
            (Some(name), None) => row!("scene", "{name}"),
            (None, Some(line)) => row!("scene", "line {line}"),
            (None, None) => {}
        }
        row!("canvas", "{} px", size(self.canvas));
        row!("pixels per grid", "{}", self.pixels_per_grid);

        if let Some(o) = &self.offsets {
            row!("padding offset", "{} px", pair(o.padding));
            row!("background shift", "{} px", pair(o.background));
            row!("grid shift", "{} px", pair(o.grid));
            row!("total offset", "{} px ({})", pair(o.total), o.composition);
        }

        if let Some(fit) = &self.fit {
            row!(
                "bounding box",
                "{} - {} px",
                pair(fit.bounds.min),
                pair(fit.bounds.max)
            );
            row!("target image", "{} px", size(fit.target));
            row!("gain", "{}", fit.gain);
            row!("fit offset", "{} px", pair(fit.offset));
            row!(
                "implied height",
                "{:.2} px ({:.3}% off)",
                fit.implied_height,
                fit.relative_error * 100.0
            );
        }

        if self.correction != DVec2::ZERO {
            row!("correction", "{} grid", pair(self.correction));
        }
        row!("furthest vertex", "{} grid", pair(self.furthest_vertex));
        if self.map_size == self.nominal_map_size {
            row!("map size", "{} grid", size(self.map_size));
        } else {
            row!(
                "map size",
                "{} grid (expanded from {})",
                size(self.map_size),
                size(self.nominal_map_size)
            );
        }
        row!("line of sight", "{}", self.line_of_sight);
        row!("portals", "{}", self.portals);
        row!("skipped walls", "{}", self.skipped);
        for w in &self.warnings {
            row!("warning", "{w}");
        }
        Ok(())
    }
}
