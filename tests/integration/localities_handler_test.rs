// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{fast_options, single_page, Fault, ScriptedEngine};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use cep_crawler::domain::models::region::RegionCode;
use cep_crawler::domain::repositories::result_sink::ResultSink;
use cep_crawler::infrastructure::storage::JsonlResultSink;
use cep_crawler::presentation::routes::routes;
use cep_crawler::workers::orchestrator::CrawlOrchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    output: PathBuf,
    _dir: TempDir,
}

fn create_test_app(engine: ScriptedEngine) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("result.jsonl");

    let orchestrator = Arc::new(CrawlOrchestrator::new(Arc::new(engine), fast_options()));
    let sink: Arc<dyn ResultSink> = Arc::new(JsonlResultSink::new(&output));

    let router = routes()
        .layer(Extension(orchestrator))
        .layer(Extension(sink));

    TestApp {
        router,
        output,
        _dir: dir,
    }
}

fn northeast() -> ScriptedEngine {
    ScriptedEngine::builder()
        .pages(RegionCode::PB, single_page(&[("João Pessoa", "58000-001 a 58099-999")]))
        .pages(
            RegionCode::CE,
            single_page(&[
                ("Fortaleza", "60000-001 a 61599-999"),
                ("Sobral", "62000-001 a 62119-999"),
            ]),
        )
        .pages(RegionCode::AL, single_page(&[("Maceió", "57000-001 a 57099-999")]))
        .build()
}

async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_localities_success_writes_output() {
    let app = create_test_app(northeast());

    let (status, body) = get(app.router, "/v1/localidades/PB%20,%20CE,AL%20").await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().expect("array body");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["uf"], "PB");
    assert_eq!(results[1]["uf"], "CE");
    assert_eq!(results[2]["uf"], "AL");
    assert_eq!(results[1]["localidades"][1]["localidade"], "Sobral");
    assert_eq!(
        results[1]["localidades"][1]["faixa de cep"],
        "62000-001 a 62119-999"
    );
    assert!(results[1]["localidades"][1]["id"].is_string());

    let written = std::fs::read_to_string(&app.output).expect("output file");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
    assert_eq!(first["uf"], "PB");
}

#[tokio::test]
async fn test_unknown_region_is_not_found() {
    let app = create_test_app(northeast());

    let (status, body) = get(app.router, "/v1/localidades/JI").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().expect("error message").contains("JI"));
    assert!(!app.output.exists());
}

#[tokio::test]
async fn test_too_many_regions_is_bad_request() {
    let app = create_test_app(northeast());

    let (status, body) = get(app.router, "/v1/localidades/PB,CE,AL,RN,PE,BA").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_session_failure_is_internal_error() {
    let engine = ScriptedEngine::builder()
        .pages(RegionCode::PB, single_page(&[("João Pessoa", "58000-001 a 58099-999")]))
        .fault(RegionCode::CE, Fault::SearchFails)
        .build();
    let app = create_test_app(engine);

    let (status, body) = get(app.router, "/v1/localidades/PB,CE").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().expect("error message").contains("CE"));
    assert!(!app.output.exists());
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app(northeast());

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/v1/version")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&bytes[..], env!("CARGO_PKG_VERSION").as_bytes());
}
