//! Typed model of the parts of `tsconfig.json` that drive path aliasing.
//!
//! Only `compilerOptions.baseUrl` and `compilerOptions.paths` are modelled.
//! Everything else in the file is ignored. The file format is JSONC, so line
//! and block comments as well as trailing commas are removed before parsing.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Conventional file name of the alias configuration.
pub const TSCONFIG_FILE: &str = "tsconfig.json";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub compiler_options: Option<CompilerOptions>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub base_url: Option<String>,

    /// Alias pattern → candidate targets, in file order.
    #[serde(default)]
    pub paths: Option<IndexMap<String, Vec<String>>>,
}

impl TsConfig {
    /// Parse tsconfig text. `origin` is only used for error messages.
    pub fn parse(source: &str, origin: &Path) -> Result<Self> {
        let cleaned = strip_jsonc(source);
        serde_json::from_str(&cleaned).map_err(|source| ConfigError::InvalidJson {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read `tsconfig.json` from a workspace root.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(TSCONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let source = fs::read_to_string(&path)?;
        Self::parse(&source, &path).map(Some)
    }

    pub fn base_url(&self) -> &str {
        self.compiler_options
            .as_ref()
            .and_then(|o| o.base_url.as_deref())
            .unwrap_or(".")
    }

    pub fn paths(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.compiler_options
            .as_ref()
            .and_then(|o| o.paths.as_ref())
            .into_iter()
            .flat_map(|paths| paths.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }
}

/// Remove `//` and `/* */` comments and trailing commas outside of strings.
pub fn strip_jsonc(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(source: &str) -> String {
    let bytes: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = bytes[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}
