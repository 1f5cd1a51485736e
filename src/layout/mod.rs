//! Layout facade: the single entry points callers use.

mod adapter;
mod route;
mod sequence;
pub(crate) mod types;

pub use adapter::routing_for_kind;
pub use sequence::{NODE_KIND_INTERACTION, NODE_KIND_LIFELINE};
pub use types::*;

use crate::config::{DiagramFamily, LayoutAlgorithm, LayoutConfig, LayoutOverrides};
use crate::error::{LayoutError, Result};
use crate::solver::{DefaultSolver, LayoutSolver};

/// Lay out the given graph with the built-in solver. Empty inputs produce
/// an empty result; repeated calls with identical input are bit-identical
/// (the engine keeps no state between calls).
pub fn apply_layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    apply_layout_with_solver(nodes, edges, config, &DefaultSolver)
}

/// Like [`apply_layout`], but against a caller-supplied solver. This is the
/// substitution seam for alternative constraint solvers; a solver error
/// fails the whole call, no partial result is synthesized.
pub fn apply_layout_with_solver(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    config: &LayoutConfig,
    solver: &dyn LayoutSolver,
) -> Result<LayoutResult> {
    config.validate()?;

    if config.algorithm == LayoutAlgorithm::Sequence {
        return Ok(sequence::compute_sequence_layout(nodes, config));
    }

    let request = adapter::build_request(nodes, edges, config);
    let solved = solver.solve(request)?;
    let (positions, geometries, unpositioned) = adapter::read_positions(&solved, nodes, config);
    let routes = route::extract_routes(&solved, &geometries);
    Ok(LayoutResult {
        positions,
        routes,
        unpositioned,
    })
}

/// Lay out with a diagram family's recommended settings, caller overrides
/// winning per field. Unknown family names are a caller error.
pub fn apply_recommended_layout(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    family: &str,
    overrides: &LayoutOverrides,
) -> Result<LayoutResult> {
    let family = DiagramFamily::parse(family).ok_or_else(|| LayoutError::UnknownDiagramFamily {
        family: family.to_string(),
    })?;
    let config = overrides.apply(family.recommended_config());
    apply_layout(nodes, edges, &config)
}
