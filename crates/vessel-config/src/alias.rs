//! Path-alias table built from `compilerOptions.paths`.
//!
//! Each configured alias `prefix/*` → `[target/*, ...]` becomes one
//! [`AliasEntry`] whose target directory is `root/baseUrl/target`. Only the
//! first configured target is honored.
//!
//! # Precedence
//!
//! When several prefixes match a specifier, the longest prefix wins. Entries
//! with equal prefix length keep configuration order. The table is sorted
//! once at construction and is immutable afterwards.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::error::ConfigError;
use crate::tsconfig::TsConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    prefix: String,
    target: PathBuf,
}

impl AliasEntry {
    pub fn new(prefix: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }

    /// Alias prefix without its trailing wildcard (e.g. `@`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Absolute directory the prefix maps to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Substitute this alias in `specifier`.
    ///
    /// Returns `None` unless the specifier starts with `prefix + "/"`.
    pub fn substitute(&self, specifier: &str) -> Option<PathBuf> {
        let rest = specifier.strip_prefix(self.prefix.as_str())?;
        let rest = rest.strip_prefix('/')?;
        Some(self.target.join(rest))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from raw entries, applying the longest-prefix ordering.
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut entries: Vec<AliasEntry> = entries.into_iter().collect();
        // Stable sort keeps configuration order among equal lengths.
        entries.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { entries }
    }

    /// Build a table from a parsed tsconfig rooted at `root`.
    pub fn from_tsconfig(config: &TsConfig, root: &Path) -> Self {
        let base = root.join(config.base_url());
        let entries = config.paths().filter_map(|(pattern, targets)| {
            let prefix = strip_wildcard(pattern);
            if prefix.is_empty() {
                tracing::debug!(pattern, "Skipping catch-all path alias");
                return None;
            }
            let Some(first) = targets.first() else {
                tracing::debug!(pattern, "Skipping path alias without targets");
                return None;
            };
            let target = base.join(strip_wildcard(first)).clean();
            Some(AliasEntry::new(prefix, target))
        });
        Self::from_entries(entries)
    }

    /// Read `tsconfig.json` from `root` and build the table.
    ///
    /// A missing or unparseable file is not fatal: it is logged as a warning
    /// and an empty table is returned.
    pub fn load(root: &Path) -> Self {
        match TsConfig::load(root) {
            Ok(Some(config)) => {
                let table = Self::from_tsconfig(&config, root);
                tracing::info!(aliases = table.len(), "Loaded path aliases");
                table
            }
            Ok(None) => {
                tracing::warn!(root = %root.display(), "No tsconfig.json found, continuing without path aliases");
                Self::empty()
            }
            Err(err) => {
                warn_unusable(&err);
                Self::empty()
            }
        }
    }

    /// Every entry whose prefix matches `specifier`, paired with the
    /// substituted path, in precedence order.
    pub fn candidates<'a>(
        &'a self,
        specifier: &'a str,
    ) -> impl Iterator<Item = (&'a AliasEntry, PathBuf)> + 'a {
        self.entries
            .iter()
            .filter_map(move |entry| entry.substitute(specifier).map(|path| (entry, path)))
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn warn_unusable(err: &ConfigError) {
    tracing::warn!(error = %err, "Ignoring unusable tsconfig.json, continuing without path aliases");
}

/// `@/*` → `@`, `./src/*` → `./src`, `*` → ``.
fn strip_wildcard(pattern: &str) -> &str {
    let pattern = pattern.strip_suffix("/*").unwrap_or(pattern);
    pattern.strip_suffix('*').unwrap_or(pattern)
}
