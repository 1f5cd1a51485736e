//! Route extraction: flattens the solver's nested edge output into one
//! polyline per edge and snaps the terminal points onto node boundaries.

use std::collections::BTreeMap;

use tracing::debug;

use crate::geometry::{NodeGeometry, Point, ensure_minimum_distance, project_to_boundary};
use crate::solver::{EdgeRouting, SolverEdge, SolverNode};

use super::types::{EdgeRoute, RoutingMode};

/// Minimum length of the stub leaving the source and entering the target on
/// orthogonal connectors. Keeps the perpendicular entry visible when the
/// solver bends very close to a node boundary.
const CONNECTOR_CLEARANCE: f64 = 24.0;

/// One route per solver edge, keyed by edge id. Edges that flatten to fewer
/// than two distinct points record no route; the renderer falls back to a
/// straight center-to-center line for those.
pub(super) fn extract_routes(
    solved: &SolverNode,
    geometries: &BTreeMap<String, NodeGeometry>,
) -> BTreeMap<String, EdgeRoute> {
    let mut collected = Vec::new();
    collect_edges(solved, &mut collected);

    let mut routes = BTreeMap::new();
    for edge in collected {
        let mut points = flatten_sections(edge);
        if points.len() < 2 {
            debug!(edge = %edge.id, "dropping route with fewer than 2 points");
            continue;
        }

        if let Some(source) = geometries.get(&edge.source) {
            points[0] = project_to_boundary(points[1], source);
        }
        if let Some(target) = geometries.get(&edge.target) {
            let toward = points[points.len() - 2];
            let last = points.len() - 1;
            points[last] = project_to_boundary(toward, target);
        }

        let routing = match edge.routing {
            EdgeRouting::Orthogonal => RoutingMode::Orthogonal,
            EdgeRouting::Spline => RoutingMode::Spline,
        };
        if routing == RoutingMode::Orthogonal {
            ensure_minimum_distance(&mut points, 0, 1, CONNECTOR_CLEARANCE);
            let last = points.len() - 1;
            ensure_minimum_distance(&mut points, last, last - 1, CONNECTOR_CLEARANCE);
        }

        routes.insert(edge.id.clone(), EdgeRoute { points, routing });
    }
    routes
}

/// The solver may return edges at any nesting level; walk the whole tree.
fn collect_edges<'a>(node: &'a SolverNode, out: &mut Vec<&'a SolverEdge>) {
    out.extend(node.edges.iter());
    for child in &node.children {
        collect_edges(child, out);
    }
}

/// Concatenate all sections in order, dropping consecutive points that are
/// coordinate-identical.
fn flatten_sections(edge: &SolverEdge) -> Vec<Point> {
    let mut points = Vec::new();
    for section in &edge.sections {
        push_dedup(&mut points, section.start);
        for &bend in &section.bends {
            push_dedup(&mut points, bend);
        }
        push_dedup(&mut points, section.end);
    }
    points
}

fn push_dedup(points: &mut Vec<Point>, point: Point) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}
