//! Universal VTT output document.
//!
//! Field order in these structs is the key order in the serialized JSON.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::errors::ConvertError;

/// Version marker written to every document
pub const FORMAT_VERSION: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvttDocument {
    pub format: f64,
    pub resolution: Resolution,
    pub image: String,
    pub line_of_sight: Vec<[GridPoint; 2]>,
    pub portals: Vec<Portal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub map_origin: GridPoint,
    pub map_size: GridPoint,
    pub pixels_per_grid: f64,
}

/// A point in grid units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl From<DVec2> for GridPoint {
    fn from(v: DVec2) -> Self {
        GridPoint { x: v.x, y: v.y }
    }
}

impl From<GridPoint> for DVec2 {
    fn from(p: GridPoint) -> Self {
        DVec2::new(p.x, p.y)
    }
}

/// A door
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    /// Midpoint of `bounds`
    pub position: GridPoint,
    pub bounds: [GridPoint; 2],
    pub closed: bool,
    pub freestanding: bool,
}

impl Portal {
    pub fn new(start: DVec2, end: DVec2, closed: bool) -> Self {
        Portal {
            position: ((start + end) * 0.5).into(),
            bounds: [start.into(), end.into()],
            closed,
            freestanding: false,
        }
    }
}

impl UvttDocument {
    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ConvertError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
