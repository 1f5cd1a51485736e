//! Layered (Sugiyama-style) backend: greedy cycle breaking, longest-path
//! ranking with a backward tightening pass, layer-sweep barycenter ordering,
//! centered coordinate assignment, orthogonal channel routing.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use super::{Flow, SolverNode, SolverOptions, build_sections, keys};

/// Layer-sweep passes over the rank ordering.
const ORDER_PASSES: usize = 4;

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
        let mut raw_edges = Vec::with_capacity(node.edges.len());
        for edge in &node.edges {
            if let (Some(&source), Some(&target)) =
                (index_of.get(&edge.source), index_of.get(&edge.target))
            {
                if source != target {
                    raw_edges.push((source, target));
                }
            }
        }

        let dag_edges = if options.get_or(keys::LAYERED_CYCLE_BREAKING, "greedy") == "none" {
            raw_edges
        } else {
            break_cycles(count, &raw_edges)
        };

        let mut graph = DiGraphMap::<usize, ()>::new();
        for index in 0..count {
            graph.add_node(index);
        }
        for &(source, target) in &dag_edges {
            graph.add_edge(source, target, ());
        }

        let ranks = assign_ranks(&graph, count);
        let mut layers = group_by_rank(&ranks);
        if options.get_or(keys::LAYERED_CROSSING_MINIMIZATION, "layer-sweep") != "none" {
            minimize_crossings(&mut layers, &graph, count, ORDER_PASSES);
        }
        assign_coordinates(node, &layers, flow, node_spacing, layer_spacing);
    }

    let channel = if options.get_or(keys::LAYERED_EDGE_ROUTING, "orthogonal") == "orthogonal" {
        Some(flow.vertical())
    } else {
        None
    };
    build_sections(node, channel, options);
}

/// Greedy cycle breaking: one DFS over the input order, back edges reversed.
/// Any cycle contains a back edge of the DFS forest, so the returned edge
/// list is acyclic.
fn break_cycles(count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut adjacency = vec![Vec::new(); count];
    for (edge_index, &(source, target)) in edges.iter().enumerate() {
        adjacency[source].push((edge_index, target));
    }

    // 0 = unvisited, 1 = on the DFS stack, 2 = finished
    let mut state = vec![0u8; count];
    let mut reversed = vec![false; edges.len()];
    for start in 0..count {
        if state[start] != 0 {
            continue;
        }
        state[start] = 1;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(frame) = stack.last_mut() {
            let (current, next) = *frame;
            if next < adjacency[current].len() {
                frame.1 += 1;
                let (edge_index, target) = adjacency[current][next];
                match state[target] {
                    0 => {
                        state[target] = 1;
                        stack.push((target, 0));
                    }
                    1 => reversed[edge_index] = true,
                    _ => {}
                }
            } else {
                state[current] = 2;
                stack.pop();
            }
        }
    }

    edges
        .iter()
        .enumerate()
        .map(|(index, &(source, target))| {
            if reversed[index] {
                (target, source)
            } else {
                (source, target)
            }
        })
        .collect()
}

/// Longest-path ranking: forward pass places each node one rank after its
/// deepest predecessor, the backward pass pulls nodes toward their
/// successors to shorten long edges.
fn assign_ranks(graph: &DiGraphMap<usize, ()>, count: usize) -> Vec<usize> {
    let order = toposort(graph, None).unwrap_or_else(|_| (0..count).collect());
    let mut ranks = vec![0usize; count];
    for &current in &order {
        let rank = graph
            .neighbors_directed(current, Direction::Incoming)
            .map(|pred| ranks[pred] + 1)
            .max()
            .unwrap_or(0);
        ranks[current] = rank;
    }
    for &current in order.iter().rev() {
        let min_successor = graph
            .neighbors_directed(current, Direction::Outgoing)
            .map(|succ| ranks[succ])
            .min();
        if let Some(min_successor) = min_successor {
            if min_successor > ranks[current] + 1 {
                ranks[current] = min_successor - 1;
            }
        }
    }
    ranks
}

fn group_by_rank(ranks: &[usize]) -> Vec<Vec<usize>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut layers = vec![Vec::new(); max_rank + 1];
    for (index, &rank) in ranks.iter().enumerate() {
        layers[rank].push(index);
    }
    layers
}

/// Alternating down/up barycenter sweeps. Each node is keyed by the mean
/// in-layer position of its neighbors on the fixed side; ties keep the
/// current order, so the sweep is stable and deterministic.
fn minimize_crossings(
    layers: &mut [Vec<usize>],
    graph: &DiGraphMap<usize, ()>,
    count: usize,
    passes: usize,
) {
    for pass in 0..passes {
        if pass % 2 == 0 {
            for rank in 1..layers.len() {
                reorder_layer(layers, rank, graph, count, Direction::Incoming);
            }
        } else {
            for rank in (0..layers.len().saturating_sub(1)).rev() {
                reorder_layer(layers, rank, graph, count, Direction::Outgoing);
            }
        }
    }
}

fn reorder_layer(
    layers: &mut [Vec<usize>],
    rank: usize,
    graph: &DiGraphMap<usize, ()>,
    count: usize,
    side: Direction,
) {
    let mut position = vec![0usize; count];
    for layer in layers.iter() {
        for (index, &member) in layer.iter().enumerate() {
            position[member] = index;
        }
    }

    let mut keyed: Vec<(f64, usize, usize)> = layers[rank]
        .iter()
        .enumerate()
        .map(|(index, &member)| {
            let neighbors: Vec<usize> = graph
                .neighbors_directed(member, side)
                .map(|neighbor| position[neighbor])
                .collect();
            let barycenter = if neighbors.is_empty() {
                index as f64
            } else {
                neighbors.iter().sum::<usize>() as f64 / neighbors.len() as f64
            };
            (barycenter, index, member)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    layers[rank] = keyed.into_iter().map(|(_, _, member)| member).collect();
}

/// Ranks advance along the flow's main axis; within a rank, nodes advance
/// along the cross axis and each rank is centered against the widest one.
fn assign_coordinates(
    node: &mut SolverNode,
    layers: &[Vec<usize>],
    flow: Flow,
    node_spacing: f64,
    layer_spacing: f64,
) {
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

    let mut rank_extent = vec![0.0f64; layers.len()];
    let mut row_total = vec![0.0f64; layers.len()];
    for (rank, layer) in layers.iter().enumerate() {
        for &member in layer {
            rank_extent[rank] = rank_extent[rank].max(sizes[member].0);
            row_total[rank] += sizes[member].1;
        }
        if !layer.is_empty() {
            row_total[rank] += node_spacing * (layer.len() - 1) as f64;
        }
    }

    let mut rank_offset = vec![0.0f64; layers.len()];
    let mut accumulated = 0.0;
    for rank in 0..layers.len() {
        rank_offset[rank] = accumulated;
        accumulated += rank_extent[rank] + layer_spacing;
    }
    let total_main = (accumulated - layer_spacing).max(0.0);
    let max_row = row_total.iter().copied().fold(0.0f64, f64::max);

    let count = node.children.len();
    let mut main = vec![0.0f64; count];
    let mut cross = vec![0.0f64; count];
    for (rank, layer) in layers.iter().enumerate() {
        let mut cursor = (max_row - row_total[rank]) / 2.0;
        for &member in layer {
            main[member] = rank_offset[rank] + (rank_extent[rank] - sizes[member].0) / 2.0;
            cross[member] = cursor;
            cursor += sizes[member].1 + node_spacing;
        }
    }

    for (index, child) in node.children.iter_mut().enumerate() {
        let (x, y) = match flow {
            Flow::Down => (cross[index], main[index]),
            Flow::Up => (cross[index], total_main - main[index] - sizes[index].0),
            Flow::Right => (main[index], cross[index]),
            Flow::Left => (total_main - main[index] - sizes[index].0, cross[index]),
        };
        child.x = Some(x);
        child.y = Some(y);
    }
}
