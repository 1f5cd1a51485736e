//! Sequence-diagram specializer. Lifelines are a positional row, not a
//! graph problem, so the general solver is never invoked: lifelines take
//! fixed slots, the interaction container sits centered above the row, and
//! messages are left to the renderer (their style follows the message's own
//! semantic type, not the layout).

use std::collections::BTreeMap;

use tracing::warn;

use crate::config::LayoutConfig;
use crate::geometry::Point;

use super::types::{LayoutNode, LayoutResult};

/// Node kind tag marking a sequence-diagram participant.
pub const NODE_KIND_LIFELINE: &str = "lifeline";
/// Node kind tag marking the interaction container drawn above the row.
pub const NODE_KIND_INTERACTION: &str = "interaction";

pub(super) fn compute_sequence_layout(
    nodes: &[LayoutNode],
    config: &LayoutConfig,
) -> LayoutResult {
    let mut positions = BTreeMap::new();
    let mut unpositioned = Vec::new();

    let pitch = config.node_spacing + config.node_width;
    let lifeline_count = nodes
        .iter()
        .filter(|node| node.kind.as_deref() == Some(NODE_KIND_LIFELINE))
        .count();
    let span = if lifeline_count == 0 {
        config.node_width
    } else {
        (lifeline_count - 1) as f64 * pitch + config.node_width
    };
    let container_x = span / 2.0 - config.node_width / 2.0;
    let container_y = -(config.node_height + config.layer_spacing);

    let mut slot = 0usize;
    for node in nodes {
        match node.kind.as_deref() {
            Some(NODE_KIND_LIFELINE) => {
                positions.insert(node.id.clone(), Point::new(slot as f64 * pitch, 0.0));
                slot += 1;
            }
            Some(NODE_KIND_INTERACTION) => {
                positions.insert(node.id.clone(), Point::new(container_x, container_y));
            }
            _ => {
                warn!(node = %node.id, "sequence layout does not place untagged nodes");
                positions.insert(node.id.clone(), Point::new(0.0, 0.0));
                unpositioned.push(node.id.clone());
            }
        }
    }

    LayoutResult {
        positions,
        routes: BTreeMap::new(),
        unpositioned,
    }
}
