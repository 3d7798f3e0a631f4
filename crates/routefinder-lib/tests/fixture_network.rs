mod common;

use common::{is_simple, roads_fixture};
use routefinder_lib::{
    build_graph, compare_routes, load_source, plan_route, BuildOptions, Graph, NodeIndex,
    PlanStrategy, RouteAlgorithm, RouteMode, RouteRequest, RouteSummary, SearchStatus,
};

/// Longitude/latitude of the fixture's south-west and north-east corners.
const SOUTH_WEST: (f64, f64) = (106.900, 47.900);
const NORTH_EAST: (f64, f64) = (106.920, 47.910);
const ISOLATED: (f64, f64) = (106.955, 47.950);

/// Shortest south-west to north-east distance, in Web Mercator metres.
const CORNER_TO_CORNER: f64 = 3886.978;

fn load(options: &BuildOptions) -> Graph {
    let mut source = load_source(&roads_fixture(), None).expect("fixture opens");
    build_graph(source.as_mut(), options).expect("fixture builds")
}

fn locate(index: &NodeIndex, (lon, lat): (f64, f64)) -> u32 {
    index.nearest_lonlat(lon, lat).expect("non-empty index").node
}

#[test]
fn fixture_builds_expected_topology() {
    let graph = load(&BuildOptions::default());
    let stats = graph.stats();
    assert_eq!(stats.segments, 7);
    assert_eq!(stats.nodes, 8);
    assert_eq!(stats.edges, 9);
    assert_eq!(stats.adjacency_entries, 18);
    assert_eq!(graph.edge_count(), 18);
}

#[test]
fn respecting_oneway_drops_the_reverse_link() {
    let graph = load(&BuildOptions {
        respect_oneway: true,
        ..BuildOptions::default()
    });
    assert_eq!(graph.edge_count(), 17);
}

#[test]
fn nearest_node_snaps_to_intersection() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let hit = index.nearest_lonlat(106.9101, 47.9099).expect("hit");
    let [lon, lat] = graph.lonlat(hit.node).expect("node exists");
    assert!((lon - 106.910).abs() < 1e-9);
    assert!((lat - 47.910).abs() < 1e-9);
    assert!(hit.distance < 30.0);
}

#[test]
fn shortest_and_minsteps_agree_on_grid_corners() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let start = locate(&index, SOUTH_WEST);
    let goal = locate(&index, NORTH_EAST);

    let shortest = plan_route(&graph, &RouteRequest::new(start, goal, RouteMode::Shortest))
        .expect("plan");
    let best = shortest.best().expect("path");
    assert!((best.weight - CORNER_TO_CORNER).abs() < 1e-2);
    assert_eq!(best.hops(), 3);

    let minsteps = plan_route(&graph, &RouteRequest::new(start, goal, RouteMode::MinSteps))
        .expect("plan");
    assert_eq!(minsteps.strategy, PlanStrategy::Search(RouteAlgorithm::Bfs));
    assert_eq!(minsteps.best().expect("path").hops(), 3);
}

#[test]
fn all_mode_bounds_alternatives_by_detour_factor() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let start = locate(&index, SOUTH_WEST);
    let goal = locate(&index, NORTH_EAST);

    let plan = plan_route(&graph, &RouteRequest::new(start, goal, RouteMode::All)).expect("plan");
    assert_eq!(plan.strategy, PlanStrategy::Enumerate);
    assert_eq!(plan.status, SearchStatus::Complete);
    let bound = plan.weight_bound.expect("derived bound");
    assert!((bound - CORNER_TO_CORNER * 1.5).abs() < 1e-2);
    assert!(plan.paths.len() >= 3);
    for path in &plan.paths {
        assert!(path.weight <= bound);
        assert!(is_simple(&path.nodes));
    }
}

#[test]
fn isolated_component_is_unreachable_for_every_mode() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let start = locate(&index, SOUTH_WEST);
    let goal = locate(&index, ISOLATED);

    for plan in compare_routes(&graph, start, goal).expect("compare") {
        assert!(!plan.is_found(), "{} found a path", plan.mode);
        let summary = RouteSummary::from_plan(&graph, &plan);
        assert_eq!(summary.error, Some("no path found"));
    }

    let dfs = plan_route(
        &graph,
        &RouteRequest::new(start, goal, RouteMode::Shortest).with_algorithm("dfs"),
    )
    .expect("plan");
    assert!(!dfs.is_found());
    assert!(dfs.note.is_some());
}

#[test]
fn compare_runs_three_strategies() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let start = locate(&index, SOUTH_WEST);
    let goal = locate(&index, NORTH_EAST);

    let plans = compare_routes(&graph, start, goal).expect("compare");
    let strategies: Vec<_> = plans.iter().map(|plan| plan.strategy).collect();
    assert_eq!(
        strategies,
        vec![
            PlanStrategy::Search(RouteAlgorithm::Dijkstra),
            PlanStrategy::Search(RouteAlgorithm::Bfs),
            PlanStrategy::Enumerate,
        ]
    );
    assert!(plans.iter().all(|plan| plan.is_found()));
    assert!(plans[2].paths.len() <= 20);
}

#[test]
fn summary_lists_road_names() {
    let graph = load(&BuildOptions::default());
    let index = NodeIndex::build(&graph);
    let start = locate(&index, SOUTH_WEST);
    let goal = locate(&index, (106.920, 47.900));

    let plan = plan_route(&graph, &RouteRequest::new(start, goal, RouteMode::Shortest))
        .expect("plan");
    let summary = RouteSummary::from_plan(&graph, &plan);
    assert_eq!(summary.paths[0].roads, vec!["Seoul Street".to_string()]);
    assert_eq!(summary.paths[0].path.len(), 3);
}
