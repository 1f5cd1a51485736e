//! Multi-root tree backend. Roots are the in-degree-zero nodes; each tree
//! is laid out with parents centered over the packed extents of their
//! subtrees, and the trees are placed side by side. Nodes left unreachable
//! by the tree walk (cycles) become additional roots so every node is
//! placed.

use std::collections::HashMap;

use super::{Flow, SolverNode, SolverOptions, build_sections, keys};

pub(crate) fn run(node: &mut SolverNode, options: &SolverOptions) {
    let flow = Flow::from_options(options);
    let node_spacing = options.f64_or(keys::SPACING_NODE_NODE, 80.0);
    let layer_spacing = options.f64_or(keys::SPACING_LAYER_LAYER, 100.0);

    let count = node.children.len();
    if count > 0 {
        let mut index_of = HashMap::with_capacity(count);
        for (index, child) in node.children.iter().enumerate() {
            index_of.insert(child.id.clone(), index);
        }

        let mut outgoing = vec![Vec::new(); count];
        let mut indegree = vec![0usize; count];
        for edge in &node.edges {
            if let (Some(&source), Some(&target)) =
                (index_of.get(&edge.source), index_of.get(&edge.target))
            {
                if source != target {
                    outgoing[source].push(target);
                    indegree[target] += 1;
                }
            }
        }

        // Tree-ify: first parent wins, later edges to an already-adopted
        // node are ignored for placement (the router still draws them).
        let mut children_of = vec![Vec::new(); count];
        let mut depth = vec![0usize; count];
        let mut visited = vec![false; count];
        let mut roots = Vec::new();
        let mut queue = std::collections::VecDeque::new();

        for index in 0..count {
            if indegree[index] == 0 {
                visited[index] = true;
                roots.push(index);
                queue.push_back(index);
            }
        }
        loop {
            while let Some(current) = queue.pop_front() {
                for &target in &outgoing[current] {
                    if visited[target] {
                        continue;
                    }
                    visited[target] = true;
                    depth[target] = depth[current] + 1;
                    children_of[current].push(target);
                    queue.push_back(target);
                }
            }
            // Cyclic leftovers: promote the first unvisited node to a root.
            match visited.iter().position(|&seen| !seen) {
                Some(index) => {
                    visited[index] = true;
                    roots.push(index);
                    queue.push_back(index);
                }
                None => break,
            }
        }

        // (main, cross) extents per node in canonical flow space.
        let sizes: Vec<(f64, f64)> = node
            .children
            .iter()
            .map(|child| {
                if flow.vertical() {
                    (child.height, child.width)
                } else {
                    (child.width, child.height)
                }
            })
            .collect();

        // Subtree cross extents, computed children-first (deepest depth up).
        let mut extent = vec![0.0f64; count];
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|a, b| depth[*b].cmp(&depth[*a]));
        for &index in &order {
            let kids = &children_of[index];
            if kids.is_empty() {
                extent[index] = sizes[index].1;
            } else {
                let packed: f64 = kids.iter().map(|&kid| extent[kid]).sum::<f64>()
                    + node_spacing * (kids.len() - 1) as f64;
                extent[index] = sizes[index].1.max(packed);
            }
        }

        // Cross positions: each subtree gets a block, parents centered.
        let mut cross = vec![0.0f64; count];
        let mut cursor = 0.0;
        let mut stack = Vec::new();
        for &root in &roots {
            stack.push((root, cursor));
            cursor += extent[root] + node_spacing;
            while let Some((index, block_start)) = stack.pop() {
                let block_center = block_start + extent[index] / 2.0;
                cross[index] = block_center - sizes[index].1 / 2.0;
                let kids = &children_of[index];
                if kids.is_empty() {
                    continue;
                }
                let packed: f64 = kids.iter().map(|&kid| extent[kid]).sum::<f64>()
                    + node_spacing * (kids.len() - 1) as f64;
                let mut kid_cursor = block_center - packed / 2.0;
                for &kid in kids {
                    stack.push((kid, kid_cursor));
                    kid_cursor += extent[kid] + node_spacing;
                }
            }
        }

        // Main positions: one row per depth, like layered ranks.
        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut rank_extent = vec![0.0f64; max_depth + 1];
        for index in 0..count {
            rank_extent[depth[index]] = rank_extent[depth[index]].max(sizes[index].0);
        }
        let mut rank_offset = vec![0.0f64; max_depth + 1];
        let mut accumulated = 0.0;
        for rank in 0..=max_depth {
            rank_offset[rank] = accumulated;
            accumulated += rank_extent[rank] + layer_spacing;
        }
        let total_main = (accumulated - layer_spacing).max(0.0);

        for (index, child) in node.children.iter_mut().enumerate() {
            let main =
                rank_offset[depth[index]] + (rank_extent[depth[index]] - sizes[index].0) / 2.0;
            let (x, y) = match flow {
                Flow::Down => (cross[index], main),
                Flow::Up => (cross[index], total_main - main - sizes[index].0),
                Flow::Right => (main, cross[index]),
                Flow::Left => (total_main - main - sizes[index].0, cross[index]),
            };
            child.x = Some(x);
            child.y = Some(y);
        }
    }

    build_sections(node, Some(flow.vertical()), options);
}
