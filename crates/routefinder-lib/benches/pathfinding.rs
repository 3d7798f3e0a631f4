use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use routefinder_lib::{
    bounded_dfs, build_graph, enumerate_paths, fewest_edges, shortest_weighted, BuildOptions,
    EnumerationLimits, Graph, MemorySource, NodeId, SafeSearchLimits, Segment,
};
use std::hint::black_box;

const GRID_SIZE: usize = 60;
const CELL_METRES: f64 = 100.0;

/// Square street lattice with uneven block lengths so weighted and unweighted
/// searches disagree.
static GRID: Lazy<Graph> = Lazy::new(|| {
    let mut segments = Vec::with_capacity(2 * GRID_SIZE * GRID_SIZE);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE - 1 {
            // Bend each block through an offset midpoint to vary its length.
            let bend = ((row * 7 + col * 13) % 5) as f64 * 10.0;
            let (r, c) = (row as f64, col as f64);
            segments.push(Segment::new(vec![
                [c * CELL_METRES, r * CELL_METRES],
                [(c + 0.5) * CELL_METRES, r * CELL_METRES + bend],
                [(c + 1.0) * CELL_METRES, r * CELL_METRES],
            ]));
            segments.push(Segment::new(vec![
                [r * CELL_METRES, c * CELL_METRES],
                [r * CELL_METRES + bend, (c + 0.5) * CELL_METRES],
                [r * CELL_METRES, (c + 1.0) * CELL_METRES],
            ]));
        }
    }
    build_graph(&mut MemorySource::planar(segments), &BuildOptions::default())
        .expect("grid builds")
});

fn corners(graph: &Graph) -> (NodeId, NodeId) {
    (0, graph.node_count() as NodeId - 1)
}

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRID;
    let (start, goal) = corners(graph);

    c.bench_function("bfs_grid_corners", |b| {
        b.iter(|| {
            let path = fewest_edges(graph, start, goal).expect("valid nodes");
            black_box(path.map(|p| p.len()))
        });
    });

    c.bench_function("dijkstra_grid_corners", |b| {
        b.iter(|| {
            let path = shortest_weighted(graph, start, goal).expect("valid nodes");
            black_box(path.map(|p| p.weight))
        });
    });

    c.bench_function("bounded_dfs_grid_corners", |b| {
        let limits = SafeSearchLimits::default();
        b.iter(|| {
            let search = bounded_dfs(graph, start, goal, &limits).expect("valid nodes");
            black_box(search.status)
        });
    });

    c.bench_function("enumerate_grid_corners", |b| {
        let baseline = shortest_weighted(graph, start, goal)
            .expect("valid nodes")
            .map(|p| p.weight);
        let limits = EnumerationLimits {
            max_paths: 10,
            max_total_weight: baseline.map(|w| w * 1.5),
            max_iterations: 200_000,
            ..EnumerationLimits::default()
        };
        b.iter(|| {
            let found = enumerate_paths(graph, start, goal, &limits).expect("valid nodes");
            black_box(found.paths.len())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
