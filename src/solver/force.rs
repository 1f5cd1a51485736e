//! Force-directed backend: deterministic spiral seeding followed by a
//! fixed number of repulsion/attraction relaxation steps. No randomness, so
//! identical inputs relax to identical positions.

use std::collections::HashMap;

use super::{SolverNode, SolverOptions, build_sections, keys};

/// Relaxation steps; enough for the graph sizes diagrams reach.
const ITERATIONS: usize = 250;
/// Golden angle (radians) used for the seeding spiral.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
/// Lower bound on pair distance in the force computation.
const MIN_FORCE_DISTANCE: f64 = 0.01;

pub(crate) fn run(node: &mut SolverNode, options: &SolverOptions) {
    let repulsion = options.f64_or(keys::FORCE_REPULSION, 200.0);
    let attraction = options.f64_or(keys::FORCE_ATTRACTION, 0.1);
    let node_spacing = options.f64_or(keys::SPACING_NODE_NODE, 80.0);

    let count = node.children.len();
    if count > 0 {
        // Natural pair distance: configured spacing plus the average node
        // half-diagonal, so large nodes spread further apart.
        let average_extent = node
            .children
            .iter()
            .map(|child| (child.width + child.height) / 2.0)
            .sum::<f64>()
            / count as f64;
        let natural = node_spacing + average_extent / 2.0;

        let mut index_of = HashMap::with_capacity(count);
        for (index, child) in node.children.iter().enumerate() {
            index_of.insert(child.id.clone(), index);
        }
        let mut springs = Vec::with_capacity(node.edges.len());
        for edge in &node.edges {
            if let (Some(&source), Some(&target)) =
                (index_of.get(&edge.source), index_of.get(&edge.target))
            {
                if source != target {
                    springs.push((source, target));
                }
            }
        }

        // Seed centers on a golden-angle spiral in input order.
        let step = natural * 0.75;
        let mut centers: Vec<(f64, f64)> = (0..count)
            .map(|index| {
                let angle = GOLDEN_ANGLE * index as f64;
                let radius = step * ((index + 1) as f64).sqrt();
                (radius * angle.cos(), radius * angle.sin())
            })
            .collect();

        for iteration in 0..ITERATIONS {
            let mut forces = vec![(0.0f64, 0.0f64); count];

            for i in 0..count {
                for j in (i + 1)..count {
                    let dx = centers[i].0 - centers[j].0;
                    let dy = centers[i].1 - centers[j].1;
                    let mut distance = (dx * dx + dy * dy).sqrt();
                    let (ux, uy) = if distance < MIN_FORCE_DISTANCE {
                        // Coincident seeds: separate along a pair-dependent
                        // fixed direction instead of dividing by zero.
                        distance = MIN_FORCE_DISTANCE;
                        let angle = GOLDEN_ANGLE * (i * 31 + j) as f64;
                        (angle.cos(), angle.sin())
                    } else {
                        (dx / distance, dy / distance)
                    };
                    let push = repulsion * natural * natural / (distance * distance);
                    forces[i].0 += ux * push;
                    forces[i].1 += uy * push;
                    forces[j].0 -= ux * push;
                    forces[j].1 -= uy * push;
                }
            }

            for &(source, target) in &springs {
                let dx = centers[target].0 - centers[source].0;
                let dy = centers[target].1 - centers[source].1;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance < MIN_FORCE_DISTANCE {
                    continue;
                }
                let pull = attraction * distance;
                let (ux, uy) = (dx / distance, dy / distance);
                forces[source].0 += ux * pull;
                forces[source].1 += uy * pull;
                forces[target].0 -= ux * pull;
                forces[target].1 -= uy * pull;
            }

            // Cooling cap on per-step displacement.
            let temperature = natural * (1.0 - iteration as f64 / ITERATIONS as f64) + 1.0;
            for index in 0..count {
                let (fx, fy) = forces[index];
                let magnitude = (fx * fx + fy * fy).sqrt();
                if magnitude == 0.0 {
                    continue;
                }
                let scale = (magnitude.min(temperature)) / magnitude;
                centers[index].0 += fx * scale;
                centers[index].1 += fy * scale;
            }
        }

        // Shift the drawing into the positive quadrant, top-left anchored.
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        for (index, child) in node.children.iter().enumerate() {
            min_x = min_x.min(centers[index].0 - child.width / 2.0);
            min_y = min_y.min(centers[index].1 - child.height / 2.0);
        }
        for (index, child) in node.children.iter_mut().enumerate() {
            child.x = Some(centers[index].0 - child.width / 2.0 - min_x);
            child.y = Some(centers[index].1 - child.height / 2.0 - min_y);
        }
    }

    build_sections(node, None, options);
}
