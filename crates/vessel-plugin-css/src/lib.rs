//! Rolldown plugin for vessel stylesheets
//!
//! Intercepts `.css` / `.scss` modules in the `load` hook and turns them into
//! JavaScript modules that inject the transformed stylesheet into the page.
//!
//! ## Classification
//!
//! - `*.module.css`, `*.module.scss`: **scoped**. Class selectors are rewritten
//!   to `name_<suffix>` and the module's default export maps original names
//!   to rewritten ones, so `styles.button` in the importing code resolves to
//!   the scoped class.
//! - every other stylesheet: **global**. `@font-face` blocks and font
//!   `@import`s are stripped.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vessel_plugin_css::{RandomIds, VesselCssPlugin};
//!
//! let plugin = Arc::new(VesselCssPlugin::new(Arc::new(RandomIds)));
//! ```

use anyhow::Context;
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

mod classify;
mod config;
pub mod global;
pub mod ids;
pub mod scoped;
pub mod snippet;

pub use classify::{FileNameClassifier, StylesheetClassifier, StylesheetKind, classify};
pub use config::CssPluginOptions;
pub use global::strip_font_rules;
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use scoped::{ScopedStylesheet, scope_class_names};

/// Applies the global or scoped transform and renders the resulting module.
#[derive(Debug, Clone)]
pub struct StylesheetTransformer {
    options: CssPluginOptions,
    ids: Arc<dyn IdSource>,
}

impl StylesheetTransformer {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self::with_options(ids, CssPluginOptions::default())
    }

    pub fn with_options(ids: Arc<dyn IdSource>, options: CssPluginOptions) -> Self {
        Self { options, ids }
    }

    pub fn options(&self) -> &CssPluginOptions {
        &self.options
    }

    /// Global stylesheet text after font stripping (and minification).
    pub fn transform_global(&self, path: &Path, source: &str) -> String {
        let stripped = strip_font_rules(source);
        self.maybe_minify(path, stripped)
    }

    /// Scoped stylesheet with rewritten class names (and minification).
    pub fn transform_scoped(&self, path: &Path, source: &str) -> ScopedStylesheet {
        let mut scoped = scope_class_names(source, self.ids.as_ref());
        scoped.css = self.maybe_minify(path, scoped.css);
        scoped
    }

    /// JavaScript module text for a stylesheet of the given kind.
    pub fn to_module(&self, kind: StylesheetKind, path: &Path, source: &str) -> String {
        match kind {
            StylesheetKind::Global => snippet::global_module(&self.transform_global(path, source)),
            StylesheetKind::Scoped => {
                let scoped = self.transform_scoped(path, source);
                snippet::scoped_module(&scoped.css, &scoped.class_map)
            }
        }
    }

    fn maybe_minify(&self, path: &Path, css: String) -> String {
        if !self.options.minify {
            return css;
        }
        match minify_css(path, &css) {
            Ok(minified) => minified,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Embedding stylesheet unminified");
                css
            }
        }
    }
}

fn minify_css(path: &Path, css: &str) -> anyhow::Result<String> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: path.to_string_lossy().to_string(),
            error_recovery: true,
            ..Default::default()
        },
    )
    .map_err(|e| anyhow::anyhow!("Failed to parse CSS from {}: {:?}", path.display(), e))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow::anyhow!("Failed to minify CSS from {}: {:?}", path.display(), e))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| anyhow::anyhow!("Failed to print CSS from {}: {:?}", path.display(), e))?;

    Ok(result.code)
}

/// Rolldown plugin that loads stylesheets as style-injecting JS modules
///
/// Which ids count as stylesheets, and of which kind, is up to the
/// [`StylesheetClassifier`]; by default that is the file name.
#[derive(Debug, Clone)]
pub struct VesselCssPlugin {
    transformer: StylesheetTransformer,
    classifier: Arc<dyn StylesheetClassifier>,
}

impl VesselCssPlugin {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self::with_options(ids, CssPluginOptions::default())
    }

    pub fn with_options(ids: Arc<dyn IdSource>, options: CssPluginOptions) -> Self {
        Self {
            transformer: StylesheetTransformer::with_options(ids, options),
            classifier: Arc::new(FileNameClassifier),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn StylesheetClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn transformer(&self) -> &StylesheetTransformer {
        &self.transformer
    }
}

impl Plugin for VesselCssPlugin {
    fn name(&self) -> Cow<'static, str> {
        "vessel-css".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        use rolldown_plugin::HookUsage;
        HookUsage::Load
    }

    /// Load hook - turns stylesheets into JS modules
    ///
    /// - `Ok(Some(output))` - stylesheet transformed, returned as `ModuleType::Js`
    /// - `Ok(None)` - not a stylesheet, let Rolldown handle it
    /// - `Err(e)` - the stylesheet could not be read
    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let transformer = self.transformer.clone();
        let kind = self.classifier.kind_of(&id);

        async move {
            let Some(kind) = kind else {
                return Ok(None);
            };
            let path = Path::new(&id);

            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read stylesheet: {}", id))?;

            let code = transformer.to_module(kind, path, &source);

            tracing::debug!(
                id = %id,
                kind = ?kind,
                source_len = source.len(),
                module_len = code.len(),
                "Loaded stylesheet"
            );

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
