//! Handler tests against the shared road fixture.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use routefinder_lib::{build_graph, load_source, BuildOptions, MemorySource, Segment};
use routefinder_service::{build_router, AppState};

const SOUTH_WEST: &str = "106.900,47.900";
const NORTH_EAST: &str = "106.920,47.910";
const ISOLATED: &str = "106.955,47.950";

fn fixture_state() -> AppState {
    static STATE: OnceLock<AppState> = OnceLock::new();
    STATE
        .get_or_init(|| {
            let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../docs/fixtures/roads.geojson");
            let mut source = load_source(&path, None).expect("fixture opens");
            let graph = build_graph(source.as_mut(), &BuildOptions::default()).expect("builds");
            AppState::from_graph(graph, path.display().to_string(), Duration::from_secs(30))
        })
        .clone()
}

fn server() -> TestServer {
    TestServer::new(build_router(fixture_state())).expect("test server")
}

#[tokio::test]
async fn liveness_and_readiness() {
    let server = server();

    let live = server.get("/health/live").await;
    live.assert_status_ok();
    assert_eq!(live.json::<Value>()["status"], "ok");

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    let body = ready.json::<Value>();
    assert_eq!(body["nodes_loaded"], 8);
    assert_eq!(body["edges_loaded"], 9);
    assert!(body["source"]
        .as_str()
        .expect("source")
        .ends_with("roads.geojson"));
    assert!(body["loaded_at"].is_string());
}

#[tokio::test]
async fn shortest_route_between_corners() {
    let response = server()
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["mode"], "shortest");
    assert_eq!(body["algorithm"], "Dijkstra");
    assert_eq!(body["status"], "complete");
    assert_eq!(body["count"], 1);
    assert_eq!(body["content_type"], "application/json");
    let weight = body["paths"][0]["weight"].as_f64().expect("weight");
    assert!((weight - 3886.978).abs() < 1e-2);
    assert_eq!(body["paths"][0]["path"].as_array().map(Vec::len), Some(4));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn unknown_algorithm_falls_back_with_note() {
    let response = server()
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .add_query_param("mode", "minsteps")
        .add_query_param("alg", "astar")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["algorithm"], "BFS");
    assert_eq!(body["note"], "Unknown algorithm 'astar'; defaulted to BFS.");
}

#[tokio::test]
async fn all_mode_honours_explicit_bound() {
    let response = server()
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .add_query_param("mode", "all")
        .add_query_param("max_weight", "4000")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["algorithm"], "DFS_enumerate");
    assert_eq!(body["max_weight"], 4000.0);
    for path in body["paths"].as_array().expect("paths") {
        assert!(path["weight"].as_f64().expect("weight") <= 4000.0);
    }
}

#[tokio::test]
async fn unreachable_goal_is_not_an_error() {
    let response = server()
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", ISOLATED)
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["count"], 0);
    assert_eq!(body["paths"], Value::Array(Vec::new()));
    assert_eq!(body["error"], "no path found");
}

#[tokio::test]
async fn compare_returns_three_results() {
    let response = server()
        .get("/compare")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let modes: Vec<&str> = body["results"]
        .as_array()
        .expect("results")
        .iter()
        .filter_map(|result| result["mode"].as_str())
        .collect();
    assert_eq!(modes, ["shortest", "minsteps", "all"]);
    assert!(body["src"]["snap_distance"].as_f64().expect("distance") < 1.0);
}

#[tokio::test]
async fn bad_requests_return_problem_details() {
    let server = server();

    let missing = server.get("/route").add_query_param("src", SOUTH_WEST).await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    let body = missing.json::<Value>();
    assert_eq!(body["type"], "/problems/invalid-request");
    assert!(body["instance"].as_str().expect("request id").starts_with("req-"));

    let malformed = server
        .get("/route")
        .add_query_param("src", "north")
        .add_query_param("dst", NORTH_EAST)
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);

    let negative = server
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .add_query_param("max_paths", "-1")
        .await;
    negative.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        negative.header("content-type").to_str().expect("ascii"),
        "application/problem+json"
    );

    let mode = server
        .get("/route")
        .add_query_param("src", SOUTH_WEST)
        .add_query_param("dst", NORTH_EAST)
        .add_query_param("mode", "scenic")
        .await;
    mode.assert_status(StatusCode::BAD_REQUEST);
}

/// A lattice big enough that enumerating it cannot finish inside a zero timeout.
fn lattice_state(timeout: Duration) -> AppState {
    const SIZE: usize = 40;
    let mut segments = Vec::new();
    for row in 0..SIZE {
        for col in 0..SIZE - 1 {
            let (r, c) = (row as f64 * 100.0, col as f64 * 100.0);
            segments.push(Segment::new(vec![[c, r], [c + 100.0, r]]));
            segments.push(Segment::new(vec![[r, c], [r, c + 100.0]]));
        }
    }
    let graph = build_graph(&mut MemorySource::planar(segments), &BuildOptions::default())
        .expect("lattice builds");
    AppState::from_graph(graph, "lattice", timeout)
}

#[tokio::test]
async fn slow_queries_time_out_with_503() {
    let server = TestServer::new(build_router(lattice_state(Duration::ZERO))).expect("server");
    let response = server
        .get("/route")
        .add_query_param("src", "0,0")
        .add_query_param("dst", "0.03,0.03")
        .add_query_param("mode", "all")
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["type"], "/problems/service-unavailable");
}
