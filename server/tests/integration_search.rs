use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sieve_core::persist::{write_index, IndexPaths};
use sieve_core::{Codec, IndexBuilder};
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(prefix: &std::path::Path) {
    let mut builder = IndexBuilder::new();
    builder.accept("doc-a", &["rust", "system"]).unwrap();
    builder.accept("doc-b", &["rust", "learn"]).unwrap();
    builder.accept("doc-c", &["system", "learn", "rust"]).unwrap();
    let index = builder.finalize(Codec::EliasDelta, vec![]);
    write_index(&IndexPaths::from_prefix(prefix), &index).unwrap();
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn app_for_tiny_index(dir: &std::path::Path) -> Router {
    let prefix = dir.join("tiny");
    build_tiny_index(&prefix);
    server::build_app(&prefix).unwrap()
}

#[tokio::test]
async fn search_returns_conjunctive_matches() {
    let dir = tempdir().unwrap();
    let app = app_for_tiny_index(dir.path());

    let (status, body) = call(app, "/search?q=rust%20system").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 2);
    let arr = json["results"].as_array().unwrap();
    let keys: Vec<&str> = arr.iter().map(|h| h["external_id"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["doc-a", "doc-c"]);
    assert!(arr.iter().all(|h| h["score"].as_f64() == Some(1.0)));
}

#[tokio::test]
async fn search_with_unknown_term_is_empty() {
    let dir = tempdir().unwrap();
    let app = app_for_tiny_index(dir.path());

    let (status, body) = call(app, "/search?q=rust%20python").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_limit_truncates_results() {
    let dir = tempdir().unwrap();
    let app = app_for_tiny_index(dir.path());

    let (_, body) = call(app, "/search?q=rust&k=1").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(json["results"][0]["doc_id"], 1);
}

#[tokio::test]
async fn doc_lookup_maps_ids_to_keys() {
    let dir = tempdir().unwrap();
    let app = app_for_tiny_index(dir.path());

    let (status, body) = call(app.clone(), "/doc/2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["external_id"], "doc-b");

    let (status, _) = call(app, "/doc/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
