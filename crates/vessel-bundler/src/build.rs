//! The bundling pipeline for one workspace.
//!
//! ```text
//! tsconfig.json ──► AliasTable ─────────────┐
//! workspace walk ─► global stylesheets ──┐  │
//!                                        ▼  ▼
//!                      __entry.tsx ──► Rolldown (resolve + load hooks)
//!                                        │
//!                                        ▼
//!                           single ESM chunk ──► Artifact
//! ```

use std::path::Path;
use std::sync::Arc;

use rolldown::{
    BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform, RawMinifyOptions,
    ResolveOptions,
};
use rolldown_common::Output;
use vessel_config::{AliasTable, DependencyMap, OutputMode};
use vessel_plugin_css::{CssPluginOptions, IdSource, RandomIds, VesselCssPlugin};

use crate::artifact::Artifact;
use crate::discovery::{StylesheetAsset, discover_global_stylesheets};
use crate::entry::{EntryOptions, entry_path, synthesize};
use crate::plugins::{
    FailureSlot, ModuleTable, PluginPhase, PluginRegistry, SourceLoaderPlugin,
    WorkspaceResolvePlugin,
};
use crate::resolver::{CONDITION_NAMES, MAIN_FIELDS, ModuleResolver};
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Extensions Rolldown tries for extensionless relative imports and the entry.
pub const SOURCE_EXTENSIONS: [&str; 7] = [".tsx", ".ts", ".jsx", ".js", ".json", ".mjs", ".cjs"];

/// Name of the output chunk.
const CHUNK_NAME: &str = "bundle";

#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub entry: EntryOptions,
    pub output_mode: OutputMode,
    /// Minify the linked output and embedded stylesheets.
    pub minify: bool,
    /// Suffix source for scoped class names.
    pub ids: Arc<dyn IdSource>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            entry: EntryOptions::default(),
            output_mode: OutputMode::default(),
            minify: true,
            ids: Arc::new(RandomIds),
        }
    }
}

impl BundleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: EntryOptions) -> Self {
        self.entry = entry;
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }
}

/// Everything a successful bundle produces.
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    pub artifact: Artifact,
    /// Runtime dependencies declared by the workspace manifest.
    pub dependencies: DependencyMap,
    /// Global stylesheets imported by the entry, in import order.
    pub stylesheets: Vec<StylesheetAsset>,
}

/// Bundle a provisioned workspace into an [`Artifact`].
///
/// Writes `__entry.tsx` into the workspace root; the caller owns the
/// workspace and is expected to delete it afterwards.
pub async fn bundle_workspace(workspace: &Workspace, options: &BundleOptions) -> Result<BundleOutcome> {
    let aliases = AliasTable::load(workspace.root());
    tracing::info!(aliases = aliases.len(), "Built alias table");

    let stylesheets = {
        let workspace = workspace.clone();
        tokio::task::spawn_blocking(move || discover_global_stylesheets(&workspace))
            .await
            .map_err(|e| std::io::Error::other(format!("Task join error: {}", e)))?
    };

    let entry = entry_path(workspace.root());
    let entry_text = synthesize(workspace.root(), &stylesheets, &options.entry);
    tokio::fs::write(&entry, entry_text).await?;

    let js = link(workspace, aliases, &entry, options).await?;
    tracing::info!(bytes = js.len(), "Linked bundle");

    Ok(BundleOutcome {
        artifact: Artifact::assemble(js, options.output_mode),
        dependencies: workspace.dependencies(),
        stylesheets,
    })
}

/// Run Rolldown from `entry` and return the single linked chunk.
pub async fn link(
    workspace: &Workspace,
    aliases: AliasTable,
    entry: &Path,
    options: &BundleOptions,
) -> Result<String> {
    let failures = FailureSlot::default();
    let modules = ModuleTable::default();
    let resolver = Arc::new(ModuleResolver::new(workspace, aliases));

    let css = VesselCssPlugin::with_options(
        Arc::clone(&options.ids),
        CssPluginOptions::new().with_minify(options.minify),
    )
    .with_classifier(Arc::new(modules.clone()));

    let mut registry = PluginRegistry::new();
    registry.add(WorkspaceResolvePlugin::new(
        resolver,
        failures.clone(),
        modules.clone(),
    ));
    registry.add_with_phase(Arc::new(css), PluginPhase::Load);
    registry.add(SourceLoaderPlugin::new(Arc::new(workspace.clone()), modules));

    let mut bundler = BundlerBuilder::default()
        .with_options(rolldown_options(workspace, entry, options.minify))
        .with_plugins(registry.into_rolldown_plugins())
        .build()
        .map_err(|e| Error::from_rolldown_batch(&e))?;

    let output = match bundler.generate().await {
        Ok(output) => output,
        Err(e) => {
            // Prefer the typed failure recorded by the resolve hook
            return Err(match failures.take() {
                Some(failure) => Error::Resolution(failure),
                None => Error::from_rolldown_batch(&e),
            });
        }
    };

    if !output.warnings.is_empty() {
        tracing::debug!(count = output.warnings.len(), "Rolldown reported warnings");
    }

    single_chunk(output.assets)
}

fn rolldown_options(workspace: &Workspace, entry: &Path, minify: bool) -> BundlerOptions {
    BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(CHUNK_NAME.to_string()),
            import: entry.to_string_lossy().into_owned(),
        }]),
        cwd: Some(workspace.root().to_path_buf()),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Browser),
        minify: minify.then(|| RawMinifyOptions::from(true)),
        inline_dynamic_imports: Some(true),
        resolve: Some(ResolveOptions {
            main_fields: Some(MAIN_FIELDS.iter().map(|f| f.to_string()).collect()),
            condition_names: Some(CONDITION_NAMES.iter().map(|c| c.to_string()).collect()),
            extensions: Some(SOURCE_EXTENSIONS.iter().map(|e| e.to_string()).collect()),
            modules: Some(vec![workspace.dependency_dir_name().to_string()]),
            alias_fields: Some(vec![vec!["browser".to_string()]]),
            symlinks: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn single_chunk(assets: Vec<Output>) -> Result<String> {
    let mut chunks = assets.iter().filter_map(|asset| {
        if let Output::Chunk(chunk) = asset {
            Some(chunk.code.clone())
        } else {
            None
        }
    });

    let code = chunks
        .next()
        .ok_or_else(|| Error::InvalidOutput("bundle produced no JavaScript chunk".to_string()))?;
    let extra = chunks.count();
    if extra > 0 {
        return Err(Error::InvalidOutput(format!(
            "expected a single chunk, got {}",
            extra + 1
        )));
    }
    Ok(code)
}
