//! Shared test utilities for vessel-bundler tests
//!
//! Builds throwaway workspaces with a hand-written `node_modules`, so the
//! pipeline runs end to end without a package manager.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use vessel_bundler::{BundleOptions, OutputMode, SequentialIds, Workspace};

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

/// Minimal ESM stand-ins for react, react/jsx-runtime and react-dom/client.
pub fn install_fake_react(root: &Path) {
    write(
        root,
        "node_modules/react/package.json",
        r#"{ "name": "react", "version": "18.3.1", "main": "index.js" }"#,
    );
    write(
        root,
        "node_modules/react/index.js",
        r#"export function createElement(type, props, ...children) {
  return { type, props, children };
}
export const StrictMode = "StrictMode";
export const Fragment = "Fragment";
export default { createElement, StrictMode, Fragment };
"#,
    );
    let runtime = r#"export function jsx(type, props) {
  return { type, props };
}
export const jsxs = jsx;
export const jsxDEV = jsx;
export const Fragment = "Fragment";
"#;
    write(root, "node_modules/react/jsx-runtime.js", runtime);
    write(root, "node_modules/react/jsx-dev-runtime.js", runtime);

    write(
        root,
        "node_modules/react-dom/package.json",
        r#"{ "name": "react-dom", "version": "18.3.1", "main": "index.js" }"#,
    );
    write(root, "node_modules/react-dom/index.js", "export const version = \"18.3.1\";\n");
    write(
        root,
        "node_modules/react-dom/client.js",
        r#"export function createRoot(container) {
  return {
    render(node) {
      container.__vesselTree = node;
    },
  };
}
"#,
    );
}

/// A component repository in the shape the service receives: tsconfig
/// aliases, a global stylesheet, a scoped stylesheet and a UI component.
pub fn component_repo() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    write(
        root,
        "package.json",
        r#"{
  "name": "demo-ui",
  "dependencies": { "react": "^18.3.1", "clsx": "^2.1.0" },
  "peerDependencies": { "react": "^18.0.0", "react-dom": "^18.0.0" },
  "devDependencies": { "typescript": "^5.6.0" }
}"#,
    );
    write(
        root,
        "tsconfig.json",
        r#"{
  // shadcn-style layout
  "compilerOptions": {
    "baseUrl": ".",
    "paths": { "@/*": ["./src/*"] },
  }
}"#,
    );
    write(
        root,
        "src/app/globals.css",
        "@import url(\"https://fonts.googleapis.com/css2?family=Inter\");\n\
         @font-face { font-family: \"Geist\"; src: url(geist.woff2); }\n\
         body { background: papayawhip; }\n",
    );
    write(
        root,
        "src/components/ui/button.module.css",
        ".primary { color: rebeccapurple; }\n",
    );
    write(
        root,
        "src/components/ui/button.tsx",
        r#"import styles from "./button.module.css";
import { cn } from "@/lib/utils";

export function Button({ children }: { children: string }) {
  return <button className={cn(styles.primary, "vessel-button")}>{children}</button>;
}
"#,
    );
    write(
        root,
        "src/lib/utils.ts",
        "export function cn(...names: string[]): string {\n  return names.join(\" \");\n}\n",
    );

    install_fake_react(root);
    dir
}

/// Packages that only bundle for the browser through their `browser`
/// field: `widget` disables its `fs` import, `chart-lite` swaps its entry.
pub fn install_browser_packages(root: &Path) {
    write(
        root,
        "node_modules/widget/package.json",
        r#"{
  "name": "widget",
  "module": "browser-entry.js",
  "main": "node-entry.js",
  "browser": { "fs": false }
}"#,
    );
    write(
        root,
        "node_modules/widget/browser-entry.js",
        r#"import fs from "fs";
export function describeWidget() {
  return fs && fs.readFileSync ? "widget-on-node" : "widget-in-browser";
}
"#,
    );
    write(
        root,
        "node_modules/widget/node-entry.js",
        "export function describeWidget() { return \"widget-node-entry\"; }\n",
    );

    write(
        root,
        "node_modules/chart-lite/package.json",
        r#"{ "name": "chart-lite", "main": "dist/node.js", "browser": "dist/browser.js" }"#,
    );
    write(
        root,
        "node_modules/chart-lite/dist/node.js",
        "export const chartTarget = \"chart-for-node\";\n",
    );
    write(
        root,
        "node_modules/chart-lite/dist/browser.js",
        "export const chartTarget = \"chart-for-browser\";\n",
    );
}

/// A package that ships untranspiled TypeScript + JSX as its entry.
pub fn install_raw_tsx_package(root: &Path) {
    write(
        root,
        "node_modules/@acme/raw-ui/package.json",
        r#"{ "name": "@acme/raw-ui", "main": "src/index.tsx" }"#,
    );
    write(
        root,
        "node_modules/@acme/raw-ui/src/index.tsx",
        "export { Badge } from \"./badge\";\n",
    );
    write(
        root,
        "node_modules/@acme/raw-ui/src/badge.tsx",
        r#"type BadgeProps = { label: string };

export function Badge({ label }: BadgeProps) {
  return <span className="raw-badge">{label}</span>;
}
"#,
    );
}

pub fn open(dir: &TempDir) -> Workspace {
    Workspace::open(dir.path(), "node_modules").expect("workspace opens")
}

/// Unminified, deterministic options so assertions can match on text.
pub fn test_options(mode: OutputMode) -> BundleOptions {
    BundleOptions::new()
        .minify(false)
        .output_mode(mode)
        .ids(Arc::new(SequentialIds::new()))
}
