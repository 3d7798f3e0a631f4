//! KD-tree index for snapping query coordinates onto graph nodes.
//!
//! Routing requests arrive as longitude/latitude pairs, while searches take
//! node identifiers. [`NodeIndex`] bridges the two with an O(log n) nearest
//! node lookup over the graph's planar positions.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::Serialize;
use tracing::debug;

use crate::graph::{Graph, NodeId};
use crate::projection::wgs84_to_web_mercator;

/// KD-tree bucket size.
///
/// kiddo requires every bucket to split, so more than this many nodes sharing
/// one exact ordinate would not fit. Road networks stay far below it.
const BUCKET_SIZE: usize = 256;

/// Closest graph node to a query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestNode {
    pub node: NodeId,
    /// Planar distance from the query point, in metres.
    pub distance: f64,
}

/// Nearest-node index over a graph's planar positions.
pub struct NodeIndex {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    len: usize,
}

impl std::fmt::Debug for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIndex").field("len", &self.len).finish()
    }
}

impl NodeIndex {
    /// Index every node of `graph`.
    pub fn build(graph: &Graph) -> Self {
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        for (index, position) in graph.positions().iter().enumerate() {
            tree.add(position, index);
        }
        debug!(nodes = graph.node_count(), "built node index");
        Self {
            tree,
            len: graph.node_count(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest node to a planar Web Mercator point.
    pub fn nearest(&self, x: f64, y: f64) -> Option<NearestNode> {
        if self.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let neighbour = self.tree.nearest_one::<SquaredEuclidean>(&[x, y]);
        Some(NearestNode {
            node: neighbour.item as NodeId,
            distance: neighbour.distance.sqrt(),
        })
    }

    /// Nearest node to a WGS84 longitude/latitude.
    pub fn nearest_lonlat(&self, lon: f64, lat: f64) -> Option<NearestNode> {
        let [x, y] = wgs84_to_web_mercator(lon, lat);
        self.nearest(x, y)
    }
}
