//! Resolve hook backed by [`ModuleResolver`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};
use vessel_plugin_css::{StylesheetClassifier, StylesheetKind, classify};

use crate::plugins::{PluginPhase, VesselPlugin};
use crate::resolver::{ImportSpecifier, ModuleResolver, Namespace, ResolutionError, ResolvedModule};

/// Prefix of the virtual ids that stand in for modules disabled by a
/// `browser` field.
pub const EMPTY_MODULE_PREFIX: &str = "\0vessel-empty:";

/// First resolution failure seen during a build.
///
/// Rolldown flattens hook errors into its own diagnostics; the slot keeps the
/// typed error so the build can report the exact specifier and importer.
#[derive(Debug, Clone, Default)]
pub struct FailureSlot(Arc<Mutex<Option<ResolutionError>>>);

impl FailureSlot {
    pub fn record(&self, error: ResolutionError) {
        let mut slot = self.0.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub fn take(&self) -> Option<ResolutionError> {
        self.0.lock().take()
    }
}

/// Namespace of every id the resolve hook claimed during a build.
///
/// Load hooks read it to decide how a module is loaded; ids Rolldown
/// resolved on its own are not in the table.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable(Arc<RwLock<HashMap<String, Namespace>>>);

impl ModuleTable {
    pub fn record(&self, id: impl Into<String>, namespace: Namespace) {
        self.0.write().insert(id.into(), namespace);
    }

    pub fn namespace_of(&self, id: &str) -> Option<Namespace> {
        self.0.read().get(id).copied()
    }
}

impl StylesheetClassifier for ModuleTable {
    fn kind_of(&self, id: &str) -> Option<StylesheetKind> {
        match self.namespace_of(id) {
            Some(Namespace::CssGlobal) => Some(StylesheetKind::Global),
            Some(Namespace::CssModule) => Some(StylesheetKind::Scoped),
            Some(_) => None,
            None => classify(Path::new(id)),
        }
    }
}

/// Bundler id for a resolved module.
pub fn module_id(resolved: &ResolvedModule) -> String {
    match resolved.namespace {
        Namespace::Ignored => format!("{EMPTY_MODULE_PREFIX}{}", resolved.path.display()),
        _ => resolved.path.to_string_lossy().into_owned(),
    }
}

/// Routes every import with an importer through the workspace resolver.
///
/// - alias and package hits are claimed with their absolute path
/// - modules disabled by a `browser` field are claimed as an empty virtual
///   module
/// - relative specifiers that name an existing file are claimed as well;
///   extensionless ones are left to Rolldown's resolver, which applies the
///   configured extension list
/// - the entry itself (no importer) and virtual `\0` ids are left alone
#[derive(Debug, Clone)]
pub struct WorkspaceResolvePlugin {
    resolver: Arc<ModuleResolver>,
    failures: FailureSlot,
    modules: ModuleTable,
}

impl WorkspaceResolvePlugin {
    pub fn new(resolver: Arc<ModuleResolver>, failures: FailureSlot, modules: ModuleTable) -> Self {
        Self {
            resolver,
            failures,
            modules,
        }
    }
}

impl VesselPlugin for WorkspaceResolvePlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}

impl Plugin for WorkspaceResolvePlugin {
    fn name(&self) -> Cow<'static, str> {
        "vessel-workspace-resolve".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        use rolldown_plugin::HookUsage;
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|s| s.to_string());
        let resolver = Arc::clone(&self.resolver);
        let failures = self.failures.clone();
        let modules = self.modules.clone();

        async move {
            let Some(importer) = importer else {
                return Ok(None);
            };
            if specifier.starts_with('\0') || importer.starts_with('\0') {
                return Ok(None);
            }

            let spec = ImportSpecifier::new(specifier, importer);
            match resolver.resolve(&spec) {
                Ok(resolved)
                    if resolved.namespace == Namespace::Ignored || resolved.path.is_file() =>
                {
                    let id = module_id(&resolved);
                    modules.record(id.clone(), resolved.namespace);
                    Ok(Some(HookResolveIdOutput {
                        id: id.into(),
                        external: Some(ResolvedExternal::Bool(false)),
                        ..Default::default()
                    }))
                }
                Ok(resolved) => {
                    tracing::debug!(
                        specifier = %spec.text,
                        path = %resolved.path.display(),
                        "Deferring extensionless import to Rolldown"
                    );
                    Ok(None)
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Resolution failed");
                    failures.record(err.clone());
                    Err(anyhow::Error::new(err))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::resolver::ResolutionStep;

    fn failure(specifier: &str) -> ResolutionError {
        ResolutionError {
            specifier: specifier.to_string(),
            importer: PathBuf::from("/w/__entry.tsx"),
            reason: "not found".to_string(),
        }
    }

    #[test]
    fn test_failure_slot_keeps_first_error() {
        let slot = FailureSlot::default();
        let shared = slot.clone();
        shared.record(failure("first"));
        shared.record(failure("second"));

        assert_eq!(slot.take().map(|e| e.specifier), Some("first".to_string()));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_module_table_drives_stylesheet_kind() {
        let table = ModuleTable::default();
        table.record("/w/src/theme.css", Namespace::CssModule);
        table.record("/w/node_modules/x/index.js", Namespace::External);

        assert_eq!(table.kind_of("/w/src/theme.css"), Some(StylesheetKind::Scoped));
        assert_eq!(table.kind_of("/w/node_modules/x/index.js"), None);
        // Unrecorded ids fall back to the file name.
        assert_eq!(table.kind_of("/w/src/app.module.css"), Some(StylesheetKind::Scoped));
        assert_eq!(table.kind_of("/w/src/app.css"), Some(StylesheetKind::Global));
    }

    #[test]
    fn test_ignored_modules_get_virtual_ids() {
        let ignored = ResolvedModule {
            path: PathBuf::from("/w/node_modules/widget/fs"),
            namespace: Namespace::Ignored,
            step: ResolutionStep::Package,
        };
        let id = module_id(&ignored);
        assert!(id.starts_with(EMPTY_MODULE_PREFIX));
        assert!(id.ends_with("/w/node_modules/widget/fs"));

        let local = ResolvedModule {
            path: PathBuf::from("/w/src/app.tsx"),
            namespace: Namespace::Local,
            step: ResolutionStep::Relative,
        };
        assert_eq!(module_id(&local), "/w/src/app.tsx");
    }
}
