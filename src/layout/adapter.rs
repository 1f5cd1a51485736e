//! Translation between the engine's flat node/edge records and the solver's
//! hierarchical request tree, plus the read-back of solved coordinates.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::config::{LayoutAlgorithm, LayoutConfig, LayoutDirection};
use crate::geometry::{NodeGeometry, Point};
use crate::solver::{EdgeRouting, SolverEdge, SolverNode, SolverOptions, keys};

use super::types::{LayoutEdge, LayoutNode, RoutingMode};

/// Floor on edge-node spacing so routes keep clearance even when the caller
/// configures very small node spacing.
const EDGE_NODE_SPACING_FLOOR: f64 = 32.0;
/// Floor on edge-edge spacing, for the same reason.
const EDGE_EDGE_SPACING_FLOOR: f64 = 16.0;

/// Structural relationship kinds, drawn as right-angle connectors. Every
/// other kind, and edges with no kind at all, are drawn as splines.
static ORTHOGONAL_EDGE_KINDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "composition",
        "aggregation",
        "association",
        "specialization",
        "conjugation",
        "feature-typing",
        "feature-membership",
        "owning-membership",
        "variant-membership",
        "type-featuring",
        "feature-chaining",
        "binding-connector",
    ]
    .into_iter()
    .collect()
});

/// Routing style for an edge kind tag.
pub fn routing_for_kind(kind: Option<&str>) -> RoutingMode {
    match kind {
        Some(kind) if ORTHOGONAL_EDGE_KINDS.contains(kind) => RoutingMode::Orthogonal,
        _ => RoutingMode::Spline,
    }
}

fn algorithm_name(algorithm: LayoutAlgorithm) -> &'static str {
    match algorithm {
        LayoutAlgorithm::Layered => "layered",
        LayoutAlgorithm::Force => "force",
        LayoutAlgorithm::MultiRootTree => "mrtree",
        LayoutAlgorithm::Box => "box",
        // Dispatched to the specializer by the facade; a solver receiving
        // this name rejects it.
        LayoutAlgorithm::Sequence => "sequence",
    }
}

fn direction_name(direction: LayoutDirection) -> &'static str {
    match direction {
        LayoutDirection::Down => "DOWN",
        LayoutDirection::Up => "UP",
        LayoutDirection::Left => "LEFT",
        LayoutDirection::Right => "RIGHT",
    }
}

/// Build the solver request: one root carrying the per-algorithm option
/// block, flat children with resolved sizes, and routing-classified edges.
pub(super) fn build_request(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    config: &LayoutConfig,
) -> SolverNode {
    let mut options = SolverOptions::new();
    options.set(keys::ALGORITHM, algorithm_name(config.algorithm));
    match config.algorithm {
        LayoutAlgorithm::Layered => {
            options.set(keys::DIRECTION, direction_name(config.direction));
            options.set(keys::LAYERED_NODE_PLACEMENT, "network-simplex");
            options.set(keys::LAYERED_CROSSING_MINIMIZATION, "layer-sweep");
            options.set(keys::LAYERED_CYCLE_BREAKING, "greedy");
            options.set(keys::LAYERED_EDGE_ROUTING, "orthogonal");
        }
        LayoutAlgorithm::Force => {
            options.set_f64(keys::FORCE_REPULSION, 200.0);
            options.set_f64(keys::FORCE_ATTRACTION, 0.1);
        }
        LayoutAlgorithm::MultiRootTree => {
            options.set(keys::DIRECTION, direction_name(config.direction));
        }
        LayoutAlgorithm::Box => {
            options.set(keys::BOX_PACKING_MODE, "group, decreasing size");
        }
        LayoutAlgorithm::Sequence => {}
    }
    options.set_f64(keys::SPACING_NODE_NODE, config.node_spacing);
    options.set_f64(keys::SPACING_LAYER_LAYER, config.layer_spacing);
    options.set_f64(
        keys::SPACING_EDGE_NODE,
        (config.node_spacing / 2.0).max(EDGE_NODE_SPACING_FLOOR),
    );
    options.set_f64(
        keys::SPACING_EDGE_EDGE,
        (config.node_spacing / 4.0).max(EDGE_EDGE_SPACING_FLOOR),
    );

    let mut root = SolverNode::root(options);
    for node in nodes {
        let (width, height) = resolved_size(node, config);
        root.children.push(SolverNode::new(&node.id, width, height));
    }
    for edge in edges {
        let mut solver_edge = SolverEdge::new(&edge.id, &edge.source, &edge.target);
        solver_edge.routing = match routing_for_kind(edge.kind.as_deref()) {
            RoutingMode::Orthogonal => EdgeRouting::Orthogonal,
            RoutingMode::Spline => EdgeRouting::Spline,
        };
        root.edges.push(solver_edge);
    }
    root
}

fn resolved_size(node: &LayoutNode, config: &LayoutConfig) -> (f64, f64) {
    let width = if node.width > 0.0 {
        node.width
    } else {
        config.node_width
    };
    let height = if node.height > 0.0 {
        node.height
    } else {
        config.node_height
    };
    (width, height)
}

/// Read solved coordinates back into flat positions and route-adjustment
/// geometry. A node the solver failed to place keeps the (0,0) fallback, is
/// reported in the returned id list, and gets a fallback geometry so its
/// routes can still anchor somewhere sensible.
pub(super) fn read_positions(
    solved: &SolverNode,
    nodes: &[LayoutNode],
    config: &LayoutConfig,
) -> (
    BTreeMap<String, Point>,
    BTreeMap<String, NodeGeometry>,
    Vec<String>,
) {
    let mut geometries = BTreeMap::new();
    collect_geometries(solved, &mut geometries);

    let mut positions = BTreeMap::new();
    let mut unpositioned = Vec::new();
    for node in nodes {
        match geometries.get(&node.id) {
            Some(geometry) => {
                positions.insert(node.id.clone(), Point::new(geometry.x, geometry.y));
            }
            None => {
                warn!(node = %node.id, "solver returned no coordinates, keeping fallback position");
                let (width, height) = resolved_size(node, config);
                positions.insert(node.id.clone(), Point::new(0.0, 0.0));
                geometries.insert(node.id.clone(), NodeGeometry::new(0.0, 0.0, width, height));
                unpositioned.push(node.id.clone());
            }
        }
    }
    (positions, geometries, unpositioned)
}

fn collect_geometries(node: &SolverNode, out: &mut BTreeMap<String, NodeGeometry>) {
    for child in &node.children {
        if let (Some(x), Some(y)) = (child.x, child.y) {
            out.insert(
                child.id.clone(),
                NodeGeometry::new(x, y, child.width, child.height),
            );
        }
        collect_geometries(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_kinds_route_orthogonally() {
        for kind in ["composition", "aggregation", "feature-typing", "binding-connector"] {
            assert_eq!(routing_for_kind(Some(kind)), RoutingMode::Orthogonal, "{kind}");
        }
    }

    #[test]
    fn behavioral_and_untagged_kinds_route_as_splines() {
        assert_eq!(routing_for_kind(Some("transition")), RoutingMode::Spline);
        assert_eq!(routing_for_kind(Some("dependency")), RoutingMode::Spline);
        assert_eq!(routing_for_kind(None), RoutingMode::Spline);
    }

    #[test]
    fn layered_request_carries_strategy_options() {
        let config = LayoutConfig::default();
        let request = build_request(&[], &[], &config);
        assert_eq!(request.options.get(keys::ALGORITHM), Some("layered"));
        assert_eq!(request.options.get(keys::DIRECTION), Some("DOWN"));
        assert_eq!(
            request.options.get(keys::LAYERED_NODE_PLACEMENT),
            Some("network-simplex")
        );
        assert_eq!(
            request.options.get(keys::LAYERED_CROSSING_MINIMIZATION),
            Some("layer-sweep")
        );
        assert_eq!(
            request.options.get(keys::LAYERED_CYCLE_BREAKING),
            Some("greedy")
        );
    }

    #[test]
    fn force_request_carries_tuning_constants() {
        let config = LayoutConfig {
            algorithm: LayoutAlgorithm::Force,
            ..LayoutConfig::default()
        };
        let request = build_request(&[], &[], &config);
        assert_eq!(request.options.get_f64(keys::FORCE_REPULSION), Some(200.0));
        assert_eq!(request.options.get_f64(keys::FORCE_ATTRACTION), Some(0.1));
    }

    #[test]
    fn small_spacing_hits_the_edge_spacing_floors() {
        let config = LayoutConfig {
            node_spacing: 10.0,
            ..LayoutConfig::default()
        };
        let request = build_request(&[], &[], &config);
        assert_eq!(request.options.get_f64(keys::SPACING_EDGE_NODE), Some(32.0));
        assert_eq!(request.options.get_f64(keys::SPACING_EDGE_EDGE), Some(16.0));
    }

    #[test]
    fn unmeasured_nodes_get_fallback_sizes() {
        let config = LayoutConfig::default();
        let nodes = [LayoutNode::new("a", 0.0, -1.0)];
        let request = build_request(&nodes, &[], &config);
        assert_eq!(request.children[0].width, config.node_width);
        assert_eq!(request.children[0].height, config.node_height);
    }
}
