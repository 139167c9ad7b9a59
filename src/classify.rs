//! Wall/door classification.
//!
//! Every usable wall becomes exactly one output item: a line-of-sight
//! segment or, for doors, a portal. Walls whose transformed endpoints are not
//! finite are dropped and reported instead.

use glam::DVec2;

use crate::document::{GridPoint, Portal};
use crate::errors::Warning;
use crate::scene::Wall;
use crate::transform::GridTransform;

/// Output items for a list of walls, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub line_of_sight: Vec<[GridPoint; 2]>,
    pub portals: Vec<Portal>,
    /// One entry per dropped wall
    pub warnings: Vec<Warning>,
    /// Component-wise maximum over every emitted vertex, floored at zero
    pub furthest: DVec2,
}

impl Classified {
    pub fn skipped(&self) -> usize {
        self.warnings.len()
    }
}

pub fn classify(walls: &[Wall], transform: &GridTransform) -> Classified {
    let mut out = Classified::default();

    for wall in walls {
        let start = transform.apply(wall.start);
        let end = transform.apply(wall.end);
        if !(start.is_finite() && end.is_finite()) {
            out.warnings.push(Warning::NonFiniteWall {
                index: wall.index,
                id: wall.id.clone(),
            });
            continue;
        }

        out.furthest = out.furthest.max(start).max(end);

        if wall.door {
            out.portals.push(Portal::new(start, end, wall.closed));
        } else {
            out.line_of_sight.push([start.into(), end.into()]);
        }
    }

    out
}
