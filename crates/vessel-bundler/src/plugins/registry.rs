//! Plugin registry with execution phases.
//!
//! Rolldown runs hooks in registration order and takes the first non-`None`
//! result, so the registry sorts plugins by phase before handing them over.

use rolldown_plugin::{__inner::SharedPluginable, Plugin};
use std::sync::Arc;

/// Plugin execution phases
///
/// Plugins are executed in phase order (lower numbers first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PluginPhase {
    /// Module resolution
    ///
    /// Plugins that decide what file an import specifier refers to.
    Resolve = 10,

    /// Content loading (stylesheets, per-extension source loaders)
    Load = 20,
}

/// A Rolldown plugin that knows its execution phase
pub trait VesselPlugin: Plugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Load
    }
}

/// Plugin registry that maintains plugins in phase order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<(PluginPhase, SharedPluginable)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: VesselPlugin + 'static>(&mut self, plugin: P) {
        let phase = plugin.phase();
        self.plugins.push((phase, Arc::new(plugin)));
    }

    /// Add a plugin that does not implement [`VesselPlugin`]
    pub fn add_with_phase(&mut self, plugin: SharedPluginable, phase: PluginPhase) {
        self.plugins.push((phase, plugin));
    }

    /// Convert to Rolldown plugins in phase order
    ///
    /// The sort is stable, so plugins within one phase keep insertion order.
    pub fn into_rolldown_plugins(mut self) -> Vec<SharedPluginable> {
        self.plugins.sort_by_key(|(phase, _)| *phase);
        self.plugins.into_iter().map(|(_, plugin)| plugin).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
