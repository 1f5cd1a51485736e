//! Layout-solver contract and the built-in engine.
//!
//! The engine consumes a hierarchical request tree: a root [`SolverNode`]
//! whose children carry fixed sizes, whose edges carry routing hints, and
//! whose options name the algorithm and its tuning values. The result is the
//! same tree with absolute coordinates filled in and per-edge bend-point
//! sections attached. Anything implementing [`LayoutSolver`] against this
//! contract is substitutable for the built-in [`DefaultSolver`].

mod boxpack;
mod force;
mod layered;
mod tree;

use std::collections::BTreeMap;

use crate::geometry::{NodeGeometry, Point};

/// Names of the solver options the adapter writes and the built-in backends
/// read. Unknown keys are carried but ignored.
pub mod keys {
    pub const ALGORITHM: &str = "algorithm";
    pub const DIRECTION: &str = "direction";
    pub const SPACING_NODE_NODE: &str = "spacing.nodeNode";
    pub const SPACING_LAYER_LAYER: &str = "spacing.layerLayer";
    pub const SPACING_EDGE_NODE: &str = "spacing.edgeNode";
    pub const SPACING_EDGE_EDGE: &str = "spacing.edgeEdge";
    pub const LAYERED_NODE_PLACEMENT: &str = "layered.nodePlacement";
    pub const LAYERED_CROSSING_MINIMIZATION: &str = "layered.crossingMinimization";
    pub const LAYERED_CYCLE_BREAKING: &str = "layered.cycleBreaking";
    pub const LAYERED_EDGE_ROUTING: &str = "layered.edgeRouting";
    pub const FORCE_REPULSION: &str = "force.repulsion";
    pub const FORCE_ATTRACTION: &str = "force.attraction";
    pub const BOX_PACKING_MODE: &str = "box.packingMode";
}

/// Inner padding between a compound node's border and its laid-out children.
const HIERARCHY_PADDING: f64 = 20.0;

/// Ordered map of named numeric/string layout options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOptions(BTreeMap<String, String>);

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn set_f64(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }
}

/// Routing style requested for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRouting {
    Orthogonal,
    Spline,
}

/// One contiguous run of an edge's path. Solvers may split an edge into
/// several sections (e.g. when it crosses hierarchy boundaries); consumers
/// concatenate them in order.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSection {
    pub start: Point,
    pub bends: Vec<Point>,
    pub end: Point,
}

#[derive(Debug, Clone)]
pub struct SolverEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub routing: EdgeRouting,
    pub sections: Vec<EdgeSection>,
}

impl SolverEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            routing: EdgeRouting::Spline,
            sections: Vec::new(),
        }
    }
}

/// A node in the request/result tree. `width`/`height` are fixed inputs;
/// `x`/`y` are filled by the solver (absolute coordinates, top-left corner)
/// and stay `None` for nodes the solver could not place. `children` and
/// `edges` nest arbitrarily; `options` are read from the root.
#[derive(Debug, Clone)]
pub struct SolverNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub children: Vec<SolverNode>,
    pub edges: Vec<SolverEdge>,
    pub options: SolverOptions,
}

impl SolverNode {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            x: None,
            y: None,
            children: Vec::new(),
            edges: Vec::new(),
            options: SolverOptions::default(),
        }
    }

    pub fn root(options: SolverOptions) -> Self {
        Self {
            options,
            ..Self::new("root", 0.0, 0.0)
        }
    }

    /// Geometry of the placed children at this level, keyed by id. Children
    /// the backend left unplaced are absent.
    pub(crate) fn child_geometries(&self) -> BTreeMap<String, NodeGeometry> {
        let mut geometries = BTreeMap::new();
        for child in &self.children {
            if let (Some(x), Some(y)) = (child.x, child.y) {
                geometries.insert(
                    child.id.clone(),
                    NodeGeometry::new(x, y, child.width, child.height),
                );
            }
        }
        geometries
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Unknown layout algorithm: {name}")]
    UnknownAlgorithm { name: String },
}

/// The substitution seam of the engine: anything that can place the request
/// tree's nodes and attach bend-point sections to its edges.
pub trait LayoutSolver {
    fn solve(&self, root: SolverNode) -> Result<SolverNode, SolverError>;
}

/// Built-in solver. Stateless; every call lays out the request tree from
/// scratch, so identical inputs produce identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSolver;

impl LayoutSolver for DefaultSolver {
    fn solve(&self, mut root: SolverNode) -> Result<SolverNode, SolverError> {
        let options = root.options.clone();
        layout_level(&mut root, &options)?;
        apply_offsets(&mut root, 0.0, 0.0);
        Ok(root)
    }
}

/// Lay out one hierarchy level, depth-first: compound children are laid out
/// and resized to wrap their content before this level's backend places
/// them. Positions assigned here are local to the level.
fn layout_level(node: &mut SolverNode, options: &SolverOptions) -> Result<(), SolverError> {
    for child in &mut node.children {
        if child.children.is_empty() {
            continue;
        }
        layout_level(child, options)?;
        let mut extent_w: f64 = 0.0;
        let mut extent_h: f64 = 0.0;
        for inner in &child.children {
            if let (Some(x), Some(y)) = (inner.x, inner.y) {
                extent_w = extent_w.max(x + inner.width);
                extent_h = extent_h.max(y + inner.height);
            }
        }
        child.width = child.width.max(extent_w + 2.0 * HIERARCHY_PADDING);
        child.height = child.height.max(extent_h + 2.0 * HIERARCHY_PADDING);
    }

    match options.get_or(keys::ALGORITHM, "layered") {
        "layered" => layered::run(node, options),
        "force" => force::run(node, options),
        "mrtree" => tree::run(node, options),
        "box" => boxpack::run(node, options),
        other => {
            return Err(SolverError::UnknownAlgorithm {
                name: other.to_string(),
            });
        }
    }
    Ok(())
}

/// Convert the level-local coordinates produced by the backends into
/// absolute ones, shifting each subtree (and the edge sections owned by it)
/// by its parent's content origin.
fn apply_offsets(node: &mut SolverNode, origin_x: f64, origin_y: f64) {
    for edge in &mut node.edges {
        for section in &mut edge.sections {
            shift_point(&mut section.start, origin_x, origin_y);
            shift_point(&mut section.end, origin_x, origin_y);
            for bend in &mut section.bends {
                shift_point(bend, origin_x, origin_y);
            }
        }
    }
    for child in &mut node.children {
        if let Some(x) = child.x {
            child.x = Some(x + origin_x);
        }
        if let Some(y) = child.y {
            child.y = Some(y + origin_y);
        }
        if !child.children.is_empty() {
            let inner_x = child.x.unwrap_or(0.0) + HIERARCHY_PADDING;
            let inner_y = child.y.unwrap_or(0.0) + HIERARCHY_PADDING;
            apply_offsets(child, inner_x, inner_y);
        }
    }
}

fn shift_point(point: &mut Point, dx: f64, dy: f64) {
    point.x += dx;
    point.y += dy;
}

/// Flow direction of rank-based backends, parsed from the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Down,
    Up,
    Left,
    Right,
}

impl Flow {
    pub(crate) fn from_options(options: &SolverOptions) -> Self {
        match options.get_or(keys::DIRECTION, "DOWN") {
            "UP" => Self::Up,
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            _ => Self::Down,
        }
    }

    /// Whether ranks advance along the y axis.
    pub(crate) fn vertical(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }
}

/// Fill in `sections` for every edge at this level from the placed child
/// geometries. `channel_axis` is the rank axis of rank-based backends
/// (`Some(vertical)`); orthogonal edges are then routed through the
/// inter-rank channel, fanned apart by the edge-edge spacing. Without a
/// rank axis, orthogonal edges get a single elbow. Edges with an unplaced
/// or unknown endpoint keep an empty section list; the route extractor
/// drops those. Self-loops get a two-bend loop off the node's right side.
pub(crate) fn build_sections(
    node: &mut SolverNode,
    channel_axis: Option<bool>,
    options: &SolverOptions,
) {
    let geometries = node.child_geometries();
    let edge_node_spacing = options.f64_or(keys::SPACING_EDGE_NODE, 32.0);
    let edge_edge_spacing = options.f64_or(keys::SPACING_EDGE_EDGE, 16.0);
    let mut fan_counts: BTreeMap<(String, String), usize> = BTreeMap::new();

    for edge in &mut node.edges {
        let (Some(source), Some(target)) =
            (geometries.get(&edge.source), geometries.get(&edge.target))
        else {
            continue;
        };

        if edge.source == edge.target {
            edge.sections = vec![self_loop_section(source, edge_node_spacing)];
            continue;
        }

        let section = match (edge.routing, channel_axis) {
            (EdgeRouting::Spline, _) => straight_section(source, target),
            (EdgeRouting::Orthogonal, Some(vertical)) => {
                let pair = if edge.source <= edge.target {
                    (edge.source.clone(), edge.target.clone())
                } else {
                    (edge.target.clone(), edge.source.clone())
                };
                let occurrence = fan_counts.entry(pair).or_insert(0);
                let fan = fan_offset(*occurrence, edge_edge_spacing);
                *occurrence += 1;
                channel_section(source, target, vertical, fan)
            }
            (EdgeRouting::Orthogonal, None) => elbow_section(source, target),
        };
        edge.sections = vec![section];
    }
}

/// Symmetric fan: 0, +s, -s, +2s, -2s, ...
fn fan_offset(occurrence: usize, spacing: f64) -> f64 {
    if occurrence == 0 {
        return 0.0;
    }
    let step = occurrence.div_ceil(2) as f64;
    if occurrence % 2 == 1 {
        step * spacing
    } else {
        -step * spacing
    }
}

fn straight_section(source: &NodeGeometry, target: &NodeGeometry) -> EdgeSection {
    EdgeSection {
        start: source.center(),
        bends: Vec::new(),
        end: target.center(),
    }
}

fn channel_section(
    source: &NodeGeometry,
    target: &NodeGeometry,
    vertical: bool,
    fan: f64,
) -> EdgeSection {
    let start = source.center();
    let end = target.center();
    if vertical {
        let mid = (start.y + end.y) / 2.0 + fan;
        EdgeSection {
            start,
            bends: vec![Point::new(start.x, mid), Point::new(end.x, mid)],
            end,
        }
    } else {
        let mid = (start.x + end.x) / 2.0 + fan;
        EdgeSection {
            start,
            bends: vec![Point::new(mid, start.y), Point::new(mid, end.y)],
            end,
        }
    }
}

fn elbow_section(source: &NodeGeometry, target: &NodeGeometry) -> EdgeSection {
    let start = source.center();
    let end = target.center();
    EdgeSection {
        start,
        bends: vec![Point::new(end.x, start.y)],
        end,
    }
}

fn self_loop_section(geometry: &NodeGeometry, clearance: f64) -> EdgeSection {
    let out_x = geometry.x + geometry.width + clearance;
    let center = geometry.center();
    EdgeSection {
        start: center,
        bends: vec![
            Point::new(out_x, center.y - geometry.height * 0.25),
            Point::new(out_x, center.y + geometry.height * 0.25),
        ],
        end: center,
    }
}
