//! JavaScript module text emitted for stylesheets.

use indexmap::IndexMap;

/// Side-effecting statement that appends a `<style>` element holding `css`.
///
/// Guarded by `typeof document`, so evaluating the bundle outside a DOM is a
/// no-op.
pub fn style_injection(css: &str) -> String {
    format!(
        "typeof document<'u'&&document.head.appendChild(document.createElement('style')).appendChild(document.createTextNode({}));",
        json_string(css)
    )
}

/// Module for a global stylesheet: injection only, no exports.
pub fn global_module(css: &str) -> String {
    format!("{}\n", style_injection(css))
}

/// Module for a scoped stylesheet: injection plus the class-name map as the
/// default export.
pub fn scoped_module(css: &str, class_map: &IndexMap<String, String>) -> String {
    let map = serde_json::to_string(class_map).unwrap_or_else(|_| "{}".to_string());
    format!("{}\nexport default {};\n", style_injection(css), map)
}

fn json_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
