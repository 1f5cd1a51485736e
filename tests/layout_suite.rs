use modelgraph_layout::geometry::{NodeGeometry, Point};
use modelgraph_layout::layout::{NODE_KIND_INTERACTION, NODE_KIND_LIFELINE, apply_layout_with_solver};
use modelgraph_layout::solver::{EdgeSection, LayoutSolver, SolverError, SolverNode};
use modelgraph_layout::{
    DiagramFamily, LayoutAlgorithm, LayoutConfig, LayoutEdge, LayoutError, LayoutNode,
    LayoutOverrides, RoutingMode, apply_layout, apply_recommended_layout,
};

const EPS: f64 = 1e-6;
/// Minimum orthogonal stub length guaranteed by the route extractor.
const CLEARANCE: f64 = 24.0;

fn node(id: &str) -> LayoutNode {
    LayoutNode::new(id, 120.0, 60.0)
}

fn small_graph() -> (Vec<LayoutNode>, Vec<LayoutEdge>) {
    let nodes = vec![node("a"), node("b"), node("c"), node("d")];
    let edges = vec![
        LayoutEdge::with_kind("e0", "a", "b", "composition"),
        LayoutEdge::with_kind("e1", "a", "c", "specialization"),
        LayoutEdge::with_kind("e2", "b", "d", "transition"),
        LayoutEdge::new("e3", "c", "d"),
    ];
    (nodes, edges)
}

fn geometry_of(result: &modelgraph_layout::LayoutResult, node: &LayoutNode) -> NodeGeometry {
    let position = result.positions[&node.id];
    NodeGeometry::new(position.x, position.y, node.width, node.height)
}

fn on_boundary(point: Point, rect: &NodeGeometry) -> bool {
    let inside_x = point.x >= rect.x - EPS && point.x <= rect.x + rect.width + EPS;
    let inside_y = point.y >= rect.y - EPS && point.y <= rect.y + rect.height + EPS;
    let on_vertical = ((point.x - rect.x).abs() < EPS
        || (point.x - (rect.x + rect.width)).abs() < EPS)
        && inside_y;
    let on_horizontal = ((point.y - rect.y).abs() < EPS
        || (point.y - (rect.y + rect.height)).abs() < EPS)
        && inside_x;
    on_vertical || on_horizontal
}

#[test]
fn every_node_gets_a_finite_position() -> anyhow::Result<()> {
    let (nodes, edges) = small_graph();
    for algorithm in [
        LayoutAlgorithm::Layered,
        LayoutAlgorithm::Force,
        LayoutAlgorithm::MultiRootTree,
        LayoutAlgorithm::Box,
    ] {
        let config = LayoutConfig {
            algorithm,
            ..LayoutConfig::default()
        };
        let result = apply_layout(&nodes, &edges, &config)?;
        assert_eq!(result.positions.len(), nodes.len(), "{algorithm:?}");
        for node in &nodes {
            let position = result.positions[&node.id];
            assert!(
                position.x.is_finite() && position.y.is_finite(),
                "{algorithm:?}: {}",
                node.id
            );
        }
    }
    Ok(())
}

#[test]
fn routes_touch_node_boundaries() -> anyhow::Result<()> {
    let (nodes, edges) = small_graph();
    let result = apply_layout(&nodes, &edges, &LayoutConfig::default())?;
    for edge in &edges {
        let Some(route) = result.routes.get(&edge.id) else {
            continue;
        };
        assert!(route.points.len() >= 2, "{}", edge.id);
        let source = nodes.iter().find(|n| n.id == edge.source).unwrap();
        let target = nodes.iter().find(|n| n.id == edge.target).unwrap();
        assert!(
            on_boundary(route.points[0], &geometry_of(&result, source)),
            "{}: first point {:?} off source boundary",
            edge.id,
            route.points[0]
        );
        assert!(
            on_boundary(
                *route.points.last().unwrap(),
                &geometry_of(&result, target)
            ),
            "{}: last point off target boundary",
            edge.id
        );
    }
    Ok(())
}

#[test]
fn orthogonal_routes_keep_stub_clearance() {
    let (nodes, edges) = small_graph();
    let result = apply_layout(&nodes, &edges, &LayoutConfig::default()).expect("layout");
    for edge in &edges {
        let Some(route) = result.routes.get(&edge.id) else {
            continue;
        };
        if route.routing != RoutingMode::Orthogonal {
            continue;
        }
        let first = route.points[0].distance_to(route.points[1]);
        let count = route.points.len();
        let last = route.points[count - 1].distance_to(route.points[count - 2]);
        assert!(first >= CLEARANCE - EPS, "{}: first stub {first}", edge.id);
        assert!(last >= CLEARANCE - EPS, "{}: last stub {last}", edge.id);
    }
}

#[test]
fn structural_kinds_get_orthogonal_routes() {
    let (nodes, edges) = small_graph();
    let result = apply_layout(&nodes, &edges, &LayoutConfig::default()).expect("layout");
    assert_eq!(result.routes["e0"].routing, RoutingMode::Orthogonal);
    assert_eq!(result.routes["e1"].routing, RoutingMode::Orthogonal);
    assert_eq!(result.routes["e2"].routing, RoutingMode::Spline);
    assert_eq!(result.routes["e3"].routing, RoutingMode::Spline);
}

#[test]
fn identical_calls_yield_identical_results() {
    let (nodes, edges) = small_graph();
    for algorithm in [
        LayoutAlgorithm::Layered,
        LayoutAlgorithm::Force,
        LayoutAlgorithm::MultiRootTree,
        LayoutAlgorithm::Box,
    ] {
        let config = LayoutConfig {
            algorithm,
            ..LayoutConfig::default()
        };
        let first = apply_layout(&nodes, &edges, &config).expect("layout");
        let second = apply_layout(&nodes, &edges, &config).expect("layout");
        assert_eq!(first.positions, second.positions, "{algorithm:?}");
        assert_eq!(first.routes, second.routes, "{algorithm:?}");
    }
}

#[test]
fn layered_direction_orders_ranks() {
    let nodes = vec![node("a"), node("b")];
    let edges = vec![LayoutEdge::new("e0", "a", "b")];
    let layout = |direction| {
        let config = LayoutConfig {
            direction,
            ..LayoutConfig::default()
        };
        apply_layout(&nodes, &edges, &config).expect("layout")
    };

    let down = layout(modelgraph_layout::LayoutDirection::Down);
    assert!(down.positions["a"].y < down.positions["b"].y);
    let up = layout(modelgraph_layout::LayoutDirection::Up);
    assert!(up.positions["a"].y > up.positions["b"].y);
    let right = layout(modelgraph_layout::LayoutDirection::Right);
    assert!(right.positions["a"].x < right.positions["b"].x);
    let left = layout(modelgraph_layout::LayoutDirection::Left);
    assert!(left.positions["a"].x > left.positions["b"].x);
}

#[test]
fn sequence_lifelines_form_a_row() {
    let nodes = vec![
        LayoutNode::with_kind("alice", 0.0, 0.0, NODE_KIND_LIFELINE),
        LayoutNode::with_kind("bob", 0.0, 0.0, NODE_KIND_LIFELINE),
        LayoutNode::with_kind("carol", 0.0, 0.0, NODE_KIND_LIFELINE),
    ];
    let result =
        apply_recommended_layout(&nodes, &[], "sequence", &LayoutOverrides::default())
            .expect("layout");
    assert_eq!(result.positions["alice"], Point::new(0.0, 0.0));
    assert_eq!(result.positions["bob"], Point::new(480.0, 0.0));
    assert_eq!(result.positions["carol"], Point::new(960.0, 0.0));
    assert!(result.routes.is_empty());
}

#[test]
fn sequence_interaction_sits_centered_above_the_row() {
    let nodes = vec![
        LayoutNode::with_kind("scenario", 0.0, 0.0, NODE_KIND_INTERACTION),
        LayoutNode::with_kind("alice", 0.0, 0.0, NODE_KIND_LIFELINE),
        LayoutNode::with_kind("bob", 0.0, 0.0, NODE_KIND_LIFELINE),
        LayoutNode::with_kind("carol", 0.0, 0.0, NODE_KIND_LIFELINE),
    ];
    let result =
        apply_recommended_layout(&nodes, &[], "sequence", &LayoutOverrides::default())
            .expect("layout");
    // Centered over the 1160-wide lifeline span, one container height plus
    // layer spacing above the row.
    assert_eq!(result.positions["scenario"], Point::new(480.0, -200.0));
}

#[test]
fn state_machine_recommendation_selects_force() {
    let config = DiagramFamily::StateMachine.recommended_config();
    assert_eq!(config.algorithm, LayoutAlgorithm::Force);
    assert_eq!(config.node_spacing, 120.0);
    assert_eq!(config.layer_spacing, 120.0);

    let overridden = LayoutOverrides {
        node_spacing: Some(50.0),
        ..Default::default()
    }
    .apply(config);
    assert_eq!(overridden.algorithm, LayoutAlgorithm::Force);
    assert_eq!(overridden.node_spacing, 50.0);

    let (nodes, edges) = small_graph();
    let result = apply_recommended_layout(
        &nodes,
        &edges,
        "stateMachine",
        &LayoutOverrides {
            node_spacing: Some(50.0),
            ..Default::default()
        },
    )
    .expect("layout");
    assert_eq!(result.positions.len(), nodes.len());
}

#[test]
fn empty_input_yields_empty_result() {
    let result = apply_layout(&[], &[], &LayoutConfig::default()).expect("layout");
    assert!(result.positions.is_empty());
    assert!(result.routes.is_empty());
    assert!(result.unpositioned.is_empty());
}

#[test]
fn self_loops_survive_route_adjustment() {
    let nodes = vec![node("a"), node("b")];
    let edges = vec![
        LayoutEdge::with_kind("loop", "a", "a", "composition"),
        LayoutEdge::new("e1", "a", "b"),
    ];
    let result = apply_layout(&nodes, &edges, &LayoutConfig::default()).expect("layout");
    let route = result.routes.get("loop").expect("self-loop route");
    assert!(route.points.len() >= 2);
    let source = nodes.iter().find(|n| n.id == "a").unwrap();
    assert!(on_boundary(route.points[0], &geometry_of(&result, source)));
}

#[test]
fn unknown_family_is_a_caller_error() {
    let result = apply_recommended_layout(&[], &[], "flowchart", &LayoutOverrides::default());
    assert!(matches!(
        result,
        Err(LayoutError::UnknownDiagramFamily { .. })
    ));
}

#[test]
fn non_positive_spacing_is_rejected() {
    let config = LayoutConfig {
        node_spacing: 0.0,
        ..LayoutConfig::default()
    };
    let result = apply_layout(&[], &[], &config);
    assert!(matches!(result, Err(LayoutError::InvalidConfig { .. })));
}

/// Solver double that leaves every other node unplaced.
struct HalfPlacingSolver;

impl LayoutSolver for HalfPlacingSolver {
    fn solve(&self, mut root: SolverNode) -> Result<SolverNode, SolverError> {
        for (index, child) in root.children.iter_mut().enumerate() {
            if index % 2 == 0 {
                child.x = Some(index as f64 * 200.0);
                child.y = Some(0.0);
            }
        }
        Ok(root)
    }
}

#[test]
fn incomplete_solver_results_are_observable_not_fatal() {
    let nodes = vec![node("a"), node("b"), node("c")];
    let result = apply_layout_with_solver(&nodes, &[], &LayoutConfig::default(), &HalfPlacingSolver)
        .expect("layout");
    assert_eq!(result.positions.len(), 3);
    assert_eq!(result.unpositioned, vec!["b".to_string()]);
    assert_eq!(result.positions["b"], Point::new(0.0, 0.0));
}

/// Solver double that hides the edges inside a nested sub-graph, the way a
/// hierarchical solver reports edges crossing group boundaries.
struct NestingSolver;

impl LayoutSolver for NestingSolver {
    fn solve(&self, mut root: SolverNode) -> Result<SolverNode, SolverError> {
        for (index, child) in root.children.iter_mut().enumerate() {
            child.x = Some(index as f64 * 200.0);
            child.y = Some(0.0);
        }
        let mut group = SolverNode::new("group", 0.0, 0.0);
        group.edges = std::mem::take(&mut root.edges);
        for edge in &mut group.edges {
            edge.sections = vec![EdgeSection {
                start: Point::new(60.0, 30.0),
                bends: Vec::new(),
                end: Point::new(260.0, 30.0),
            }];
        }
        root.children.push(group);
        Ok(root)
    }
}

#[test]
fn nested_solver_output_is_flattened() {
    let nodes = vec![node("a"), node("b")];
    let edges = vec![LayoutEdge::new("e0", "a", "b")];
    let result = apply_layout_with_solver(&nodes, &edges, &LayoutConfig::default(), &NestingSolver)
        .expect("layout");
    let route = result.routes.get("e0").expect("route from nested level");
    // Projected onto the facing sides of the two 120x60 nodes.
    assert_eq!(route.points[0], Point::new(120.0, 30.0));
    assert_eq!(route.points[1], Point::new(200.0, 30.0));
}

/// Solver double that always fails.
struct FailingSolver;

impl LayoutSolver for FailingSolver {
    fn solve(&self, _root: SolverNode) -> Result<SolverNode, SolverError> {
        Err(SolverError::UnknownAlgorithm {
            name: "broken".to_string(),
        })
    }
}

#[test]
fn solver_failure_propagates_without_partial_result() {
    let (nodes, edges) = small_graph();
    let result = apply_layout_with_solver(&nodes, &edges, &LayoutConfig::default(), &FailingSolver);
    assert!(matches!(result, Err(LayoutError::Solver(_))));
}
