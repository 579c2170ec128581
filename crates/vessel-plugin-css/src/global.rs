//! Font stripping for global stylesheets.
//!
//! Three deletion passes over raw text:
//!
//! 1. every `@font-face { ... }` block
//! 2. every `@import url(...)` whose target contains `font` (any case)
//! 3. every `@import url(...)` pointing at the Google Fonts CDN
//!
//! Each pass only deletes, so applying the transform to its own output is a
//! no-op, and the passes commute.

use std::sync::LazyLock;

use regex::Regex;

static FONT_FACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@font-face\s*\{[^}]*\}").expect("valid font-face pattern"));

static IMPORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@import\s+url\(\s*([^)]*?)\s*\)[^;]*;").expect("valid import pattern")
});

static FONT_CDN_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+url\(\s*['"]?https?://fonts\.googleapis\.com[^)]*\)[^;]*;"#)
        .expect("valid font CDN pattern")
});

/// Apply all three font passes.
pub fn strip_font_rules(css: &str) -> String {
    let css = strip_font_faces(css);
    let css = strip_font_imports(&css);
    strip_font_cdn_imports(&css)
}

pub fn strip_font_faces(css: &str) -> String {
    FONT_FACE.replace_all(css, "").into_owned()
}

pub fn strip_font_imports(css: &str) -> String {
    IMPORT_URL
        .replace_all(css, |caps: &regex::Captures<'_>| {
            let target = caps.get(1).map_or("", |m| m.as_str());
            if target.to_ascii_lowercase().contains("font") {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

pub fn strip_font_cdn_imports(css: &str) -> String {
    FONT_CDN_IMPORT.replace_all(css, "").into_owned()
}
