//! Synthetic entry module.
//!
//! The entry is written next to the workspace root as `__entry.tsx` and
//! contains, in order: global stylesheet imports, the React mount
//! primitives, caller imports, the caller's `App` definition and the mount
//! sequence.

use std::path::{Path, PathBuf};

use crate::discovery::StylesheetAsset;

pub const ENTRY_FILE: &str = "__entry.tsx";

/// Id of the element the component is mounted into.
pub const ROOT_ELEMENT_ID: &str = "root";

/// Component used when the caller supplies no body.
pub const DEFAULT_RENDER_BODY: &str = "const App = () => <div>Component preview</div>;";

/// Caller-controlled parts of the entry module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Extra import statements, inserted verbatim.
    pub imports: Vec<String>,
    /// Source defining a component named `App`.
    pub render_body: Option<String>,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports(mut self, imports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    pub fn render_body(mut self, body: impl Into<String>) -> Self {
        self.render_body = Some(body.into());
        self
    }
}

pub fn entry_path(root: &Path) -> PathBuf {
    root.join(ENTRY_FILE)
}

/// Build the entry module text for a workspace rooted at `root`.
pub fn synthesize(root: &Path, stylesheets: &[StylesheetAsset], options: &EntryOptions) -> String {
    let mut out = String::new();

    for sheet in stylesheets {
        out.push_str(&format!("import '{}';\n", relative_import(root, &sheet.path)));
    }

    out.push_str("import React from 'react';\n");
    out.push_str("import { createRoot } from 'react-dom/client';\n");

    for import in &options.imports {
        let import = import.trim();
        if !import.is_empty() {
            out.push_str(import);
            out.push('\n');
        }
    }

    out.push('\n');
    out.push_str(
        options
            .render_body
            .as_deref()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or(DEFAULT_RENDER_BODY),
    );
    out.push_str("\n\n");

    out.push_str(&format!(
        "const container = document.getElementById('{ROOT_ELEMENT_ID}');\n\
         if (!container) throw new Error('Root element not found');\n\
         createRoot(container).render(\n  <React.StrictMode>\n    <App />\n  </React.StrictMode>\n);\n"
    ));

    out
}

/// `./`-prefixed, forward-slash path of `target` relative to `root`.
fn relative_import(root: &Path, target: &Path) -> String {
    let relative = target.strip_prefix(root).unwrap_or(target);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let escaped = joined.replace('\\', "\\\\").replace('\'', "\\'");
    format!("./{}", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vessel_plugin_css::StylesheetKind;

    fn sheet(path: &str) -> StylesheetAsset {
        StylesheetAsset {
            path: PathBuf::from(path),
            kind: StylesheetKind::Global,
        }
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let options = EntryOptions::new()
            .imports(["import { Button } from '@/components/ui/button';"])
            .render_body("const App = () => <Button>Hi</Button>;");
        let text = synthesize(
            Path::new("/w"),
            &[sheet("/w/app.css"), sheet("/w/nested/global.css")],
            &options,
        );

        let css_a = text.find("import './app.css';").unwrap();
        let css_b = text.find("import './nested/global.css';").unwrap();
        let react = text.find("import React from 'react';").unwrap();
        let client = text.find("import { createRoot } from 'react-dom/client';").unwrap();
        let caller = text.find("import { Button }").unwrap();
        let body = text.find("const App = () => <Button>Hi</Button>;").unwrap();
        let mount = text.find("document.getElementById('root')").unwrap();

        assert!(css_a < css_b && css_b < react && react < client);
        assert!(client < caller && caller < body && body < mount);
        assert!(text.contains("throw new Error('Root element not found')"));
        assert!(text.contains("<React.StrictMode>"));
    }

    #[test]
    fn test_default_body_when_missing_or_blank() {
        let text = synthesize(Path::new("/w"), &[], &EntryOptions::new());
        assert!(text.contains(DEFAULT_RENDER_BODY));

        let blank = synthesize(Path::new("/w"), &[], &EntryOptions::new().render_body("  \n"));
        assert!(blank.contains(DEFAULT_RENDER_BODY));
    }

    #[test]
    fn test_no_stylesheets_starts_with_react() {
        let text = synthesize(Path::new("/w"), &[], &EntryOptions::new());
        assert!(text.starts_with("import React from 'react';\n"));
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path(Path::new("/w")), PathBuf::from("/w/__entry.tsx"));
    }
}
