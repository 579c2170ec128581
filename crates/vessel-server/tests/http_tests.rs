//! HTTP surface tests, driven through the router without a socket.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use helpers::*;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("response is JSON")
}

#[tokio::test]
async fn test_health() {
    let work = TempDir::new().unwrap();
    let app = test_router(test_settings(work.path()), FixtureScm::default());

    let (response, body) = send(app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_unknown_path_and_method_are_not_found() {
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());

    let app = test_router(settings.clone(), FixtureScm::default());
    let (response, _) = send(app, get("/does-not-exist")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = test_router(settings.clone(), FixtureScm::default());
    let (response, _) = send(app, get("/bundle")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = test_router(settings, FixtureScm::default());
    let (response, _) = send(app, post_json("/health", "{}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/bundle")
        .header(header::ORIGIN, "https://preview.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let app = test_router(settings.clone(), FixtureScm::default());
    let (response, body) = send(app, preflight).await;

    assert!(response.status().is_success());
    assert!(body.is_empty());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let health = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://preview.example.com")
        .body(Body::empty())
        .unwrap();
    let app = test_router(settings, FixtureScm::default());
    let (response, _) = send(app, health).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_missing_repo_url_is_bad_request() {
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());
    let app = test_router(settings.clone(), FixtureScm::default());

    let (response, body) = send(app, post_json("/bundle", "{}")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(&body);
    assert_eq!(body["html"], Value::Null);
    assert_eq!(body["js"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("repoUrl"));
    assert!(leftover_workspaces(&settings).is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let work = TempDir::new().unwrap();
    let app = test_router(test_settings(work.path()), FixtureScm::default());

    let (response, body) = send(app, post_json("/bundle", "{\"repoUrl\": ")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(&body);
    assert_eq!(body["html"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("repoUrl"));
}

#[tokio::test]
async fn test_resolution_failure_cleans_up_workspace() {
    let fixture = component_fixture();
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());
    let app = test_router(
        settings.clone(),
        FixtureScm::default().with_branch("main", fixture.path()),
    );

    let request = serde_json::json!({
        "repoUrl": "https://example.com/acme/ui.git",
        "imports": ["import Chart from 'not-installed-chart';"],
        "entryFileContent": "const App = () => <Chart />;"
    });
    let (response, body) = send(app, post_json("/bundle", &request.to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    assert_eq!(body["html"], Value::Null);
    assert_eq!(body["js"], Value::Null);
    assert!(body.get("dependencies").is_none());
    assert!(body["error"].as_str().unwrap().contains("not-installed-chart"));

    assert!(settings.work_dir.exists());
    assert!(leftover_workspaces(&settings).is_empty());
}

#[tokio::test]
async fn test_branch_fallback_returns_default_branch_artifact() {
    let fixture = component_fixture();
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());
    let scm = FixtureScm::default().with_branch("main", fixture.path());
    let attempts = Arc::clone(&scm.attempts);
    let app = test_router(settings.clone(), scm);

    let request = serde_json::json!({
        "repoUrl": "https://example.com/acme/ui.git",
        "branch": "feature-x",
        "imports": ["import { Badge } from '@/components/ui/badge';"],
        "entryFileContent": "const App = () => <Badge label=\"fallback-ok\" />;"
    });
    let (response, body) = send(app, post_json("/bundle", &request.to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(&body);
    assert!(body.get("error").is_none());
    assert!(body["html"].as_str().unwrap().contains("<div id=\"root\"></div>"));
    assert!(body["html"].as_str().unwrap().contains("./bundle.js"));

    let js = body["js"].as_str().unwrap();
    assert!(js.contains("fallback-ok"));
    assert!(js.contains("papayawhip"));

    assert_eq!(body["dependencies"]["react"], "^18.3.1");
    assert_eq!(body["dependencies"]["react-dom"], "^18.0.0");

    assert_eq!(*attempts.lock().unwrap(), vec!["feature-x", "main"]);
    assert!(leftover_workspaces(&settings).is_empty());
}

#[tokio::test]
async fn test_clone_failure_is_internal_error() {
    let work = TempDir::new().unwrap();
    let settings = test_settings(work.path());
    let app = test_router(settings.clone(), FixtureScm::default());

    let request = r#"{ "repoUrl": "https://example.com/acme/missing.git", "branch": "main" }"#;
    let (response, body) = send(app, post_json("/bundle", request)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    assert_eq!(body["js"], Value::Null);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Provisioning failed"));
    assert!(error.contains("https://example.com/acme/missing.git"));
    // Tool output is logged, not returned
    assert!(!error.contains("not found in upstream origin"));
    assert!(leftover_workspaces(&settings).is_empty());
}

#[tokio::test]
async fn test_debug_mode_persists_artifact() {
    let fixture = component_fixture();
    let work = TempDir::new().unwrap();
    let mut settings = test_settings(work.path());
    settings.debug = true;
    settings.output_mode = vessel_config::OutputMode::Inlined;
    let app = test_router(
        settings.clone(),
        FixtureScm::default().with_branch("main", fixture.path()),
    );

    let request = r#"{ "repoUrl": "https://example.com/acme/ui.git" }"#;
    let (response, body) = send(app, post_json("/bundle", request)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(&body);
    let html = std::fs::read_to_string(settings.output_dir.join("index.html")).unwrap();
    assert_eq!(html, body["html"].as_str().unwrap());
    assert!(html.contains("Component preview"));
    assert!(settings.output_dir.join("bundle.js").is_file());
}
