use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Node record for one layout call. Sizes come from the caller's measuring
/// collaborator; non-positive values fall back to the configured defaults.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Caller-supplied tag; the sequence specializer partitions on it.
    pub kind: Option<String>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            kind: None,
        }
    }

    pub fn with_kind(id: impl Into<String>, width: f64, height: f64, kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::new(id, width, height)
        }
    }
}

/// Edge record for one layout call. `kind` is the relationship tag used to
/// pick the routing style; self-referential edges are legal.
#[derive(Debug, Clone)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: Option<String>,
}

impl LayoutEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: None,
        }
    }

    pub fn with_kind(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::new(id, source, target)
        }
    }
}

/// How the renderer should draw a route: a right-angle stepped path or a
/// smooth curve through the points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingMode {
    Orthogonal,
    Spline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRoute {
    pub points: Vec<Point>,
    pub routing: RoutingMode,
}

impl EdgeRoute {
    /// Arithmetic midpoint of the route; renderers anchor the edge label
    /// here.
    pub fn label_anchor(&self) -> Point {
        let count = self.points.len().max(1) as f64;
        let sum = self
            .points
            .iter()
            .fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
        Point::new(sum.0 / count, sum.1 / count)
    }
}

/// Result of one layout call. Positions are top-left node corners, routes
/// are keyed by edge id. Maps are ordered so repeated identical calls
/// iterate identically.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
    pub routes: BTreeMap<String, EdgeRoute>,
    /// Ids the solver returned no coordinates for; they carry the (0,0)
    /// fallback position.
    pub unpositioned: Vec<String>,
}
