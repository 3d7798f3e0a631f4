#![allow(dead_code)]

use std::path::PathBuf;

use routefinder_lib::{BuildOptions, Graph, GraphBuilder, NodeId};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn roads_fixture() -> PathBuf {
    fixtures_dir().join("roads.geojson")
}

/// Graph over `node_count` nodes spaced along the x axis, connected by the
/// given two-way `(from, to, weight)` edges. Node ids equal their index.
pub fn graph_from_edges(node_count: NodeId, edges: &[(NodeId, NodeId, f64)]) -> Graph {
    let position = |id: NodeId| [f64::from(id) * 10.0, 0.0];
    let mut builder = GraphBuilder::new(&BuildOptions::default()).expect("builder");
    for id in 0..node_count {
        builder.get_or_create_node(position(id)[0], position(id)[1]);
    }
    for &(from, to, weight) in edges {
        builder
            .add_edge(position(from), position(to), weight, false, None)
            .expect("valid edge");
    }
    builder.finish()
}

/// Whether `path` visits every node at most once.
pub fn is_simple(path: &[NodeId]) -> bool {
    let mut seen = std::collections::HashSet::new();
    path.iter().all(|node| seen.insert(*node))
}

/// Whether every consecutive pair of `path` is joined by an edge.
pub fn is_connected(graph: &Graph, path: &[NodeId]) -> bool {
    graph.path_weight(path).is_some()
}
