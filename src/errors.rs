//! Error types with rich diagnostics using miette
//!
//! Fatal problems abort a conversion and surface as [`ConvertError`].
//! Problems the engine can recover from are collected as [`Warning`]s in the
//! conversion summary instead.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Fatal Errors
// ============================================================================

/// Errors that stop a conversion before any output is produced
#[derive(Error, Diagnostic, Debug)]
pub enum ConvertError {
    #[error("invalid scene: {reason}")]
    #[diagnostic(
        code(uvtt::scene::invalid),
        help("the scene record needs positive numeric `width` and `height` fields")
    )]
    InvalidScene { reason: String },

    #[error("no scene record found in input")]
    #[diagnostic(code(uvtt::scene::not_found))]
    NoSceneFound {
        #[help]
        hint: String,
    },

    #[error("invalid grid configuration: pixels per grid {reason}")]
    #[diagnostic(
        code(uvtt::grid::invalid),
        help("set `grid.size` in the scene or pass a positive default cell size")
    )]
    InvalidGridConfiguration { value: f64, reason: NumericError },

    #[error("wall bounding box has zero width ({width} px), cannot derive a scale")]
    #[diagnostic(
        code(uvtt::fit::degenerate_bbox),
        help("use the declared-offset strategy for scenes whose walls are all vertical")
    )]
    DegenerateBoundingBox { width: f64 },

    #[error("failed to decode scene record")]
    #[diagnostic(code(uvtt::scene::decode))]
    Decode(#[from] serde_json::Error),

    #[error("i/o error on {}", path.display())]
    #[diagnostic(code(uvtt::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn invalid_scene(reason: impl Into<String>) -> Self {
        ConvertError::InvalidScene {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Recoverable Warnings
// ============================================================================

/// A problem the engine worked around; it never aborts a conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// `padding` fell outside `(0, 0.5)` and was treated as zero
    DegeneratePadding { value: f64 },
    /// A wall record could not be read; it was dropped
    MalformedWall {
        index: usize,
        id: Option<String>,
        reason: String,
    },
    /// A wall transformed to a NaN or infinite coordinate; it was dropped
    NonFiniteWall { index: usize, id: Option<String> },
    /// The fitted scale implies a different height than the target image
    AspectRatioMismatch {
        implied_height: f64,
        target_height: f64,
        relative_error: f64,
    },
    /// There were no usable walls to fit against
    EmptyWallSet,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DegeneratePadding { value } => {
                write!(f, "padding {value} is outside (0, 0.5); treating it as zero")
            }
            Warning::MalformedWall { index, id, reason } => {
                write!(f, "skipping wall {}: {reason}", wall_label(*index, id))
            }
            Warning::NonFiniteWall { index, id } => write!(
                f,
                "skipping wall {}: transform produced a non-finite coordinate",
                wall_label(*index, id)
            ),
            Warning::AspectRatioMismatch {
                implied_height,
                target_height,
                relative_error,
            } => write!(
                f,
                "aspect-ratio mismatch: fit implies {implied_height:.2}px of height but the \
                 target image is {target_height}px ({:.3}% off); the image will be letterboxed",
                relative_error * 100.0
            ),
            Warning::EmptyWallSet => write!(f, "no valid walls found in the scene"),
        }
    }
}

fn wall_label(index: usize, id: &Option<String>) -> String {
    match id {
        Some(id) => format!("'{id}' (index {index})"),
        None => format!("at index {index}"),
    }
}
