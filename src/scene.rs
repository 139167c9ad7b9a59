//! Source scene model.
//!
//! Scene exports are loosely typed: numbers show up as strings, optional
//! records show up as `null`, and individual walls can be garbage. Fields are
//! therefore decoded leniently, and walls are kept as raw JSON until
//! [`Wall::from_record`] validates them one at a time.
//!
//! serde_json is built with `arbitrary_precision`, so a literal such as
//! `1e999` survives parsing as text and reads back as infinity here instead
//! of rejecting the whole record.

use glam::{DVec2, dvec2};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{ConvertError, Warning};
use crate::types::{PixelsPerGrid, positive};

/// A scene record as exported by the authoring tool
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient_grid")]
    pub grid: Option<Grid>,
    /// Fraction of the canvas added as border on each side.
    #[serde(deserialize_with = "lenient_number")]
    pub padding: Option<f64>,
    #[serde(deserialize_with = "lenient_record")]
    pub background: Option<Background>,
    /// Grid shift stored at the top level by older exports.
    #[serde(rename = "shiftX", deserialize_with = "lenient_number")]
    pub legacy_shift_x: Option<f64>,
    #[serde(rename = "shiftY", deserialize_with = "lenient_number")]
    pub legacy_shift_y: Option<f64>,
    pub walls: Value,
}

/// The `grid` field: either a bare cell size or a record
#[derive(Debug, Clone)]
pub enum Grid {
    Size(f64),
    Spec(GridSpec),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    #[serde(deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    #[serde(rename = "shiftX", deserialize_with = "lenient_number")]
    pub shift_x: Option<f64>,
    #[serde(rename = "shiftY", deserialize_with = "lenient_number")]
    pub shift_y: Option<f64>,
}

/// Background image placement
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Background {
    #[serde(deserialize_with = "lenient_string")]
    pub src: Option<String>,
    /// Pixel position of the image centre; `None` means the canvas centre.
    #[serde(deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub y: Option<f64>,
}

impl Scene {
    /// Decode a scene from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Scene, ConvertError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Check the canvas dimensions and return them.
    pub fn validate(&self) -> Result<DVec2, ConvertError> {
        let width = dimension("width", self.width)?;
        let height = dimension("height", self.height)?;
        Ok(dvec2(width, height))
    }

    /// Cell size from `grid.size`, a numeric `grid`, or `default`.
    pub fn pixels_per_grid(&self, default: f64) -> Result<PixelsPerGrid, ConvertError> {
        let declared = match &self.grid {
            Some(Grid::Size(size)) => Some(*size),
            Some(Grid::Spec(spec)) => spec.size,
            None => None,
        };
        let value = declared.unwrap_or(default);
        PixelsPerGrid::try_new(value)
            .map_err(|reason| ConvertError::InvalidGridConfiguration { value, reason })
    }

    /// Grid origin shift in pixels, per component: `grid.shiftX` first, then
    /// the legacy top-level field, then zero.
    pub fn grid_shift(&self) -> DVec2 {
        let (x, y) = match &self.grid {
            Some(Grid::Spec(spec)) => (spec.shift_x, spec.shift_y),
            _ => (None, None),
        };
        dvec2(
            x.or(self.legacy_shift_x).unwrap_or(0.0),
            y.or(self.legacy_shift_y).unwrap_or(0.0),
        )
    }

    /// The background image identifier, or an empty string.
    pub fn image(&self) -> &str {
        self.background
            .as_ref()
            .and_then(|bg| bg.src.as_deref())
            .unwrap_or("")
    }

    /// Raw wall records; anything other than an array counts as no walls.
    pub fn wall_records(&self) -> &[Value] {
        match &self.walls {
            Value::Array(walls) => walls,
            _ => &[],
        }
    }

    /// Validate every wall record, splitting them into usable walls and
    /// warnings for the rest. Source order is preserved.
    pub fn walls(&self) -> (Vec<Wall>, Vec<Warning>) {
        let mut walls = Vec::new();
        let mut warnings = Vec::new();
        for (index, record) in self.wall_records().iter().enumerate() {
            match Wall::from_record(index, record) {
                Ok(wall) => walls.push(wall),
                Err(w) => warnings.push(w),
            }
        }
        (walls, warnings)
    }
}

fn dimension(field: &str, value: Option<f64>) -> Result<f64, ConvertError> {
    let value = value.ok_or_else(|| ConvertError::invalid_scene(format!("missing `{field}`")))?;
    positive(value).map_err(|e| ConvertError::invalid_scene(format!("`{field}` {e}")))
}

/// A validated wall segment in canvas pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    /// Position in the source `walls` array
    pub index: usize,
    pub id: Option<String>,
    pub start: DVec2,
    pub end: DVec2,
    pub door: bool,
    /// Only meaningful for doors.
    pub closed: bool,
}

impl Wall {
    /// Read one wall record. Any structural problem yields a
    /// [`Warning::MalformedWall`] describing it.
    pub fn from_record(index: usize, record: &Value) -> Result<Wall, Warning> {
        let malformed = |id: Option<String>, reason: String| Warning::MalformedWall {
            index,
            id,
            reason,
        };

        let Value::Object(fields) = record else {
            return Err(malformed(None, "record is not a JSON object".into()));
        };
        let id = fields.get("_id").and_then(Value::as_str).map(str::to_owned);

        let coords = match fields.get("c") {
            Some(Value::Array(coords)) => coords,
            Some(_) => return Err(malformed(id, "`c` is not an array".into())),
            None => return Err(malformed(id, "missing `c` coordinate array".into())),
        };
        if coords.len() != 4 {
            let reason = format!("expected 4 coordinates, found {}", coords.len());
            return Err(malformed(id, reason));
        }

        let mut c = [0.0; 4];
        for (i, (slot, raw)) in c.iter_mut().zip(coords).enumerate() {
            *slot = number_from_value(raw).ok_or_else(|| {
                malformed(id.clone(), format!("coordinate {i} is not numeric: {raw}"))
            })?;
        }

        // Booleans count as 0 and 1.
        let door = match fields.get("door") {
            Some(Value::Bool(door)) => *door,
            Some(door) => number_from_value(door) == Some(1.0),
            None => false,
        };
        // A missing door state means closed.
        let closed = match fields.get("ds") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(open)) => !open,
            Some(ds) => number_from_value(ds) == Some(0.0),
        };

        Ok(Wall {
            index,
            id,
            start: dvec2(c[0], c[1]),
            end: dvec2(c[2], c[3]),
            door,
            closed,
        })
    }
}

/// Accept JSON numbers and numeric strings. Out-of-range literals come back
/// as infinities.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().or_else(|| n.to_string().parse().ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_grid<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Grid>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(value @ Value::Object(_)) => {
            let spec = serde_json::from_value(value).map_err(D::Error::custom)?;
            Some(Grid::Spec(spec))
        }
        Some(value) => number_from_value(&value).map(Grid::Size),
        None => None,
    })
}

fn lenient_record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(d)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}
