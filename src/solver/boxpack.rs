//! Box backend: rectangle packing in "group, decreasing size" mode. Nodes
//! are shelved largest-area first into rows bounded by a near-square target
//! width, which keeps the packed drawing compact without graph structure.

use super::{SolverNode, SolverOptions, build_sections, keys};

pub(crate) fn run(node: &mut SolverNode, options: &SolverOptions) {
    let node_spacing = options.f64_or(keys::SPACING_NODE_NODE, 80.0);
    let layer_spacing = options.f64_or(keys::SPACING_LAYER_LAYER, 100.0);

    let count = node.children.len();
    if count > 0 {
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|a, b| {
            let area_a = node.children[*a].width * node.children[*a].height;
            let area_b = node.children[*b].width * node.children[*b].height;
            area_b.total_cmp(&area_a).then(a.cmp(b))
        });

        let padded_area: f64 = node
            .children
            .iter()
            .map(|child| (child.width + node_spacing) * (child.height + layer_spacing))
            .sum();
        let widest = node
            .children
            .iter()
            .map(|child| child.width)
            .fold(0.0f64, f64::max);
        let target_width = padded_area.sqrt().max(widest);

        let mut shelf_x = 0.0f64;
        let mut shelf_y = 0.0f64;
        let mut shelf_height = 0.0f64;
        for &index in &order {
            let (width, height) = (node.children[index].width, node.children[index].height);
            if shelf_x > 0.0 && shelf_x + width > target_width {
                shelf_y += shelf_height + layer_spacing;
                shelf_x = 0.0;
                shelf_height = 0.0;
            }
            let child = &mut node.children[index];
            child.x = Some(shelf_x);
            child.y = Some(shelf_y);
            shelf_x += width + node_spacing;
            shelf_height = shelf_height.max(height);
        }
    }

    build_sections(node, None, options);
}
