//! Per-extension loaders for workspace sources.
//!
//! Component repositories routinely put JSX in `.js` files, so local
//! scripts are loaded with the JSX-capable module type for their extension.
//! Dependency files keep Rolldown's default handling. Modules disabled by a
//! `browser` field load as an empty CommonJS module, so both default and
//! named imports of them evaluate to `undefined` members instead of failing
//! the link.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};

use crate::plugins::VesselPlugin;
use crate::plugins::resolve::ModuleTable;
use crate::resolver::{Namespace, namespace_for};
use crate::workspace::Workspace;

const EMPTY_MODULE: &str = "module.exports = {};\n";

/// Module type used for a local source file, by extension.
pub fn module_type_for(path: &Path) -> Option<ModuleType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "js" | "jsx" => Some(ModuleType::Jsx),
        "ts" => Some(ModuleType::Ts),
        "tsx" => Some(ModuleType::Tsx),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct SourceLoaderPlugin {
    workspace: Arc<Workspace>,
    modules: ModuleTable,
}

impl SourceLoaderPlugin {
    pub fn new(workspace: Arc<Workspace>, modules: ModuleTable) -> Self {
        Self { workspace, modules }
    }

    /// Namespace recorded by the resolve hook, or derived from the path for
    /// ids Rolldown resolved itself.
    fn namespace_of(&self, id: &str) -> Namespace {
        self.modules
            .namespace_of(id)
            .unwrap_or_else(|| namespace_for(&self.workspace, Path::new(id)))
    }
}

impl VesselPlugin for SourceLoaderPlugin {}

impl Plugin for SourceLoaderPlugin {
    fn name(&self) -> Cow<'static, str> {
        "vessel-source-loader".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        use rolldown_plugin::HookUsage;
        HookUsage::Load
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let namespace = self.namespace_of(&id);
        let workspace = Arc::clone(&self.workspace);

        async move {
            match namespace {
                Namespace::Ignored => {
                    tracing::debug!(id = %id, "Loading empty module");
                    return Ok(Some(HookLoadOutput {
                        code: EMPTY_MODULE.into(),
                        module_type: Some(ModuleType::Js),
                        ..Default::default()
                    }));
                }
                Namespace::Local => {}
                _ => return Ok(None),
            }

            let path = Path::new(&id);
            if !workspace.is_local_source(path) {
                return Ok(None);
            }
            let Some(module_type) = module_type_for(path) else {
                return Ok(None);
            };

            let code = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file: {}", id))?;

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(module_type),
                ..Default::default()
            }))
        }
    }
}
