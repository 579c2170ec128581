//! Shared test utilities for vessel-server tests
//!
//! Provisioning is faked: "cloning" copies a fixture directory that already
//! contains its `node_modules`, and installing does nothing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use tempfile::TempDir;
use tower::ServiceExt;
use vessel_bundler::SequentialIds;
use vessel_config::ServerSettings;
use async_trait::async_trait;
use vessel_server::{BundleService, PackageManager, ProvisionError, SourceControl, router};

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// Serves branches from local fixture directories; unknown branches fail
/// like `git clone` does for a missing remote branch.
#[derive(Default)]
pub struct FixtureScm {
    branches: HashMap<String, PathBuf>,
    pub attempts: Arc<Mutex<Vec<String>>>,
}

impl FixtureScm {
    pub fn with_branch(mut self, branch: &str, fixture: &Path) -> Self {
        self.branches.insert(branch.to_string(), fixture.to_path_buf());
        self
    }
}

#[async_trait]
impl SourceControl for FixtureScm {
    async fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<(), ProvisionError> {
        self.attempts.lock().unwrap().push(branch.to_string());
        let Some(fixture) = self.branches.get(branch) else {
            return Err(ProvisionError::Clone {
                url: url.to_string(),
                branch: branch.to_string(),
                reason: format!("Remote branch {branch} not found in upstream origin"),
            });
        };
        copy_tree(fixture, dest).map_err(|e| ProvisionError::Clone {
            url: url.to_string(),
            branch: branch.to_string(),
            reason: e.to_string(),
        })
    }
}

pub struct NoopInstall;

#[async_trait]
impl PackageManager for NoopInstall {
    async fn install(&self, _dir: &Path) -> Result<(), ProvisionError> {
        Ok(())
    }
}

/// A component repository with aliases, a global stylesheet and a
/// hand-written `node_modules` holding ESM stand-ins for React.
pub fn component_fixture() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    write(
        root,
        "package.json",
        r#"{
  "name": "demo-ui",
  "dependencies": { "react": "^18.3.1", "clsx": "^2.1.0" },
  "peerDependencies": { "react-dom": "^18.0.0" }
}"#,
    );
    write(
        root,
        "tsconfig.json",
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["./src/*"] } } }"#,
    );
    write(root, "src/app/globals.css", "body { background: papayawhip; }\n");
    write(
        root,
        "src/components/ui/badge.tsx",
        "export function Badge({ label }: { label: string }) {\n  return <span className=\"badge\">{label}</span>;\n}\n",
    );

    write(
        root,
        "node_modules/react/package.json",
        r#"{ "name": "react", "main": "index.js" }"#,
    );
    write(
        root,
        "node_modules/react/index.js",
        "export function createElement(type, props) { return { type, props }; }\n\
         export const StrictMode = \"StrictMode\";\n\
         export default { createElement, StrictMode };\n",
    );
    let runtime = "export function jsx(type, props) { return { type, props }; }\n\
                   export const jsxs = jsx;\n\
                   export const jsxDEV = jsx;\n\
                   export const Fragment = \"Fragment\";\n";
    write(root, "node_modules/react/jsx-runtime.js", runtime);
    write(root, "node_modules/react/jsx-dev-runtime.js", runtime);
    write(
        root,
        "node_modules/react-dom/package.json",
        r#"{ "name": "react-dom", "main": "index.js" }"#,
    );
    write(root, "node_modules/react-dom/index.js", "export const version = \"18\";\n");
    write(
        root,
        "node_modules/react-dom/client.js",
        "export function createRoot(el) { return { render(node) { el.tree = node; } }; }\n",
    );

    dir
}

/// Settings rooted in `work`, unminified so assertions can match on text.
pub fn test_settings(work: &Path) -> ServerSettings {
    ServerSettings {
        work_dir: work.join("workspaces"),
        output_dir: work.join("dist"),
        minify: false,
        ..ServerSettings::default()
    }
}

pub fn test_router(settings: ServerSettings, scm: FixtureScm) -> Router {
    let service = BundleService::new(settings, Arc::new(scm), Arc::new(NoopInstall))
        .with_ids(Arc::new(SequentialIds::new()));
    router(Arc::new(service))
}

pub async fn send(app: Router, request: Request<Body>) -> (Response<Body>, Vec<u8>) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body")
        .to_vec();
    (Response::from_parts(parts, Body::empty()), bytes)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Entries left in the workspace parent directory.
pub fn leftover_workspaces(settings: &ServerSettings) -> Vec<PathBuf> {
    match fs::read_dir(&settings.work_dir) {
        Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
        Err(_) => Vec::new(),
    }
}
