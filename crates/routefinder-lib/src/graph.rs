use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::projection::web_mercator_to_wgs84;
use crate::source::{Direction, Segment, SegmentSource};

/// Dense node identifier, assigned in creation order starting at zero.
pub type NodeId = u32;

/// Default rounding granularity for merging coordinates, in projection units.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 1e-6;

/// Descriptive attributes carried over from the source feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// Directed adjacency entry.
#[derive(Debug, Clone)]
pub struct Edge {
    pub target: NodeId,
    pub weight: f64,
    pub meta: Option<Arc<EdgeMeta>>,
}

/// Grid cell a coordinate snaps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapKey {
    pub x: i64,
    pub y: i64,
}

/// Maps snapped coordinates to node identifiers.
///
/// Two coordinates that round to the same [`SnapKey`] always receive the same
/// identifier. A node sits at its cell's snapped coordinate, so its position
/// does not depend on which vertex reached the cell first.
#[derive(Debug, Clone)]
pub struct CoordinateIndex {
    tolerance: f64,
    keys: HashMap<SnapKey, NodeId>,
    positions: Vec<[f64; 2]>,
}

impl CoordinateIndex {
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(Error::invalid(
                "snap_tolerance",
                format!("must be a positive finite number, got {tolerance}"),
            ));
        }
        Ok(Self {
            tolerance,
            keys: HashMap::new(),
            positions: Vec::new(),
        })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn snap_key(&self, x: f64, y: f64) -> SnapKey {
        SnapKey {
            x: (x / self.tolerance).round() as i64,
            y: (y / self.tolerance).round() as i64,
        }
    }

    /// Coordinate a key snaps to.
    pub fn snapped(&self, key: SnapKey) -> [f64; 2] {
        [key.x as f64 * self.tolerance, key.y as f64 * self.tolerance]
    }

    /// Return the node for `(x, y)`, allocating the next identifier if unseen.
    pub fn get_or_create_node(&mut self, x: f64, y: f64) -> NodeId {
        let key = self.snap_key(x, y);
        let next = self.positions.len() as NodeId;
        let id = *self.keys.entry(key).or_insert(next);
        if id == next {
            self.positions.push(self.snapped(key));
        }
        id
    }

    /// Look up an existing node without allocating.
    pub fn get(&self, x: f64, y: f64) -> Option<NodeId> {
        self.keys.get(&self.snap_key(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Options controlling graph construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub snap_tolerance: f64,
    /// Honour one-way markers on segments. When disabled every edge is two-way.
    pub respect_oneway: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            respect_oneway: false,
        }
    }
}

/// Counters gathered while building, kept on the graph for diagnostics.
///
/// Consecutive vertices that snap onto one node never become self-loops; they
/// are counted in `degenerate_pairs` instead, so `adjacency_entries` excludes
/// them. Searches are unaffected since a self-loop can never lie on a simple
/// path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Segments consumed from the source.
    pub segments: usize,
    /// Segments dropped for having fewer than two coordinates.
    pub skipped_segments: usize,
    /// Consecutive coordinate pairs that snapped onto the same node.
    pub degenerate_pairs: usize,
    /// Edges added, counting a two-way edge once.
    pub edges: usize,
    pub nodes: usize,
    /// Directed adjacency entries.
    pub adjacency_entries: usize,
}

/// Road graph in Web Mercator metres. Immutable once built.
#[derive(Debug, Clone)]
pub struct Graph {
    positions: Vec<[f64; 2]>,
    lonlat: Vec<[f64; 2]>,
    adjacency: Vec<Vec<Edge>>,
    snap_tolerance: f64,
    stats: BuildStats,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of directed adjacency entries.
    pub fn edge_count(&self) -> usize {
        self.stats.adjacency_entries
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn snap_tolerance(&self) -> f64 {
        self.snap_tolerance
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (node as usize) < self.positions.len()
    }

    /// Fail with [`Error::UnknownNode`] unless `node` belongs to this graph.
    pub fn check_node(&self, node: NodeId) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(Error::UnknownNode {
                id: node,
                node_count: self.node_count(),
            })
        }
    }

    /// Planar position of a node.
    pub fn position(&self, node: NodeId) -> Option<[f64; 2]> {
        self.positions.get(node as usize).copied()
    }

    /// Longitude/latitude of a node.
    pub fn lonlat(&self, node: NodeId) -> Option<[f64; 2]> {
        self.lonlat.get(node as usize).copied()
    }

    pub(crate) fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    /// Outgoing edges of `node`; empty for unknown identifiers.
    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(node as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Lightest edge from `from` to `to`, if one exists.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .filter(|edge| edge.target == to)
            .map(|edge| edge.weight)
            .min_by(f64::total_cmp)
    }

    /// Lightest edge between consecutive nodes, with its metadata.
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.neighbours(from)
            .iter()
            .filter(|edge| edge.target == to)
            .min_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Total weight of `path`, taking the lightest edge between each pair.
    ///
    /// Returns `None` when two consecutive nodes are not adjacent.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2)
            .map(|pair| self.edge_weight(pair[0], pair[1]))
            .sum()
    }
}

/// Incrementally populates a [`Graph`] from planar coordinates.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    index: CoordinateIndex,
    adjacency: Vec<Vec<Edge>>,
    respect_oneway: bool,
    stats: BuildStats,
}

impl GraphBuilder {
    pub fn new(options: &BuildOptions) -> Result<Self> {
        Ok(Self {
            index: CoordinateIndex::new(options.snap_tolerance)?,
            adjacency: Vec::new(),
            respect_oneway: options.respect_oneway,
            stats: BuildStats::default(),
        })
    }

    pub fn get_or_create_node(&mut self, x: f64, y: f64) -> NodeId {
        let id = self.index.get_or_create_node(x, y);
        if id as usize >= self.adjacency.len() {
            self.adjacency.resize_with(id as usize + 1, Vec::new);
        }
        id
    }

    /// Connect `a` to `b`, and `b` back to `a` unless `one_way`.
    pub fn add_edge(
        &mut self,
        a: [f64; 2],
        b: [f64; 2],
        weight: f64,
        one_way: bool,
        meta: Option<Arc<EdgeMeta>>,
    ) -> Result<(NodeId, NodeId)> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::invalid(
                "weight",
                format!("edge weights must be non-negative and finite, got {weight}"),
            ));
        }

        let from = self.get_or_create_node(a[0], a[1]);
        let to = self.get_or_create_node(b[0], b[1]);

        self.adjacency[from as usize].push(Edge {
            target: to,
            weight,
            meta: meta.clone(),
        });
        self.stats.adjacency_entries += 1;
        if !one_way {
            self.adjacency[to as usize].push(Edge {
                target: from,
                weight,
                meta,
            });
            self.stats.adjacency_entries += 1;
        }
        self.stats.edges += 1;
        Ok((from, to))
    }

    /// Add every consecutive coordinate pair of a planar segment as an edge.
    pub fn add_segment(&mut self, segment: Segment) -> Result<()> {
        self.stats.segments += 1;
        if segment.coords.len() < 2 {
            self.stats.skipped_segments += 1;
            return Ok(());
        }
        if let Some(bad) = segment
            .coords
            .iter()
            .find(|c| !c[0].is_finite() || !c[1].is_finite())
        {
            return Err(Error::malformed(format!(
                "non-finite coordinate ({}, {}) in segment {}",
                bad[0], bad[1], self.stats.segments
            )));
        }

        let (coords, one_way) = match (segment.direction, self.respect_oneway) {
            (_, false) | (Direction::Both, true) => (segment.coords, false),
            (Direction::Forward, true) => (segment.coords, true),
            (Direction::Backward, true) => {
                let mut coords = segment.coords;
                coords.reverse();
                (coords, true)
            }
        };

        // Snap every vertex first so degenerate pairs are detected on node ids.
        let nodes: Vec<NodeId> = coords
            .iter()
            .map(|c| self.get_or_create_node(c[0], c[1]))
            .collect();

        for (pair, ids) in coords.windows(2).zip(nodes.windows(2)) {
            if ids[0] == ids[1] {
                self.stats.degenerate_pairs += 1;
                continue;
            }
            let weight = (pair[1][0] - pair[0][0]).hypot(pair[1][1] - pair[0][1]);
            self.add_edge(pair[0], pair[1], weight, one_way, segment.meta.clone())?;
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of directed adjacency entries added so far.
    pub fn edge_count(&self) -> usize {
        self.stats.adjacency_entries
    }

    pub fn finish(self) -> Graph {
        let mut stats = self.stats;
        stats.nodes = self.index.len();
        let positions = self.index.positions;
        let lonlat = positions
            .iter()
            .map(|p| web_mercator_to_wgs84(p[0], p[1]))
            .collect();
        let mut adjacency = self.adjacency;
        adjacency.resize_with(positions.len(), Vec::new);

        Graph {
            positions,
            lonlat,
            adjacency,
            snap_tolerance: self.index.tolerance,
            stats,
        }
    }
}

/// Build a routing graph from a segment source.
///
/// Coordinates are projected into Web Mercator before snapping, so the snap
/// tolerance and all edge weights are in metres.
pub fn build_graph<S>(source: &mut S, options: &BuildOptions) -> Result<Graph>
where
    S: SegmentSource + ?Sized,
{
    let crs = source.crs();
    let segments = source.read_segments()?;
    debug!(segments = segments.len(), crs = %crs, "building graph");

    let mut builder = GraphBuilder::new(options)?;
    for mut segment in segments {
        for coord in segment.coords.iter_mut() {
            *coord = crs.to_planar(*coord);
        }
        builder.add_segment(segment)?;
    }

    if builder.edge_count() == 0 {
        return Err(Error::EmptyGraph);
    }

    let graph = builder.finish();
    let stats = graph.stats();
    info!(
        nodes = stats.nodes,
        edges = stats.edges,
        adjacency_entries = stats.adjacency_entries,
        skipped_segments = stats.skipped_segments,
        degenerate_pairs = stats.degenerate_pairs,
        "graph built"
    );
    Ok(graph)
}
