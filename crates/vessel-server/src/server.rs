//! HTTP surface.
//!
//! - `POST /bundle` - provision a repository and return `{html, js, dependencies}`
//! - `GET /health` - liveness check
//! - anything else - `404`
//!
//! Every response carries permissive CORS headers and `OPTIONS` requests get
//! an empty preflight response.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use vessel_bundler::BundleOutcome;
use vessel_config::DependencyMap;

use crate::error::{Result, ServerError};
use crate::service::{BundleRequest, BundleService};

/// Response body of `POST /bundle`.
///
/// `html` and `js` are either both strings or both null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleResponse {
    pub html: Option<String>,
    pub js: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BundleResponse {
    pub fn success(outcome: BundleOutcome) -> Self {
        Self {
            html: Some(outcome.artifact.html),
            js: Some(outcome.artifact.js),
            dependencies: Some(outcome.dependencies),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            html: None,
            js: None,
            dependencies: None,
            error: Some(message.into()),
        }
    }
}

/// A failed bundle request, rendered as `{html: null, js: null, error}`.
#[derive(Debug)]
struct BundleFailure {
    status: StatusCode,
    message: String,
}

impl BundleFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ServerError> for BundleFailure {
    fn from(err: ServerError) -> Self {
        tracing::error!(error = %err, "Bundle request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for BundleFailure {
    fn into_response(self) -> Response {
        (self.status, Json(BundleResponse::failure(self.message))).into_response()
    }
}

/// Build the router around a shared service.
pub fn router(service: Arc<BundleService>) -> Router {
    Router::new()
        .route("/bundle", post(handle_bundle).fallback(handle_not_found))
        .route("/health", get(handle_health).fallback(handle_not_found))
        .fallback(handle_not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(service: BundleService) -> Result<()> {
    let addr = format!("{}:{}", service.settings().host, service.settings().port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Bundle service listening on http://{}", addr);

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}

async fn handle_bundle(
    State(service): State<Arc<BundleService>>,
    body: Bytes,
) -> std::result::Result<Json<BundleResponse>, BundleFailure> {
    let request: BundleRequest = serde_json::from_slice(&body).map_err(|e| {
        BundleFailure::bad_request(format!(
            "Invalid JSON body ({}); expected {{\"repoUrl\": string, \"branch\"?: string, \"entryFileContent\"?: string, \"imports\"?: string[]}}",
            e
        ))
    })?;

    let repo_url = request
        .repo_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| BundleFailure::bad_request("Missing required parameter: repoUrl"))?;

    let outcome = service.bundle(repo_url, &request).await?;
    Ok(Json(BundleResponse::success(outcome)))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
