//! Stylesheet processing configuration types

/// Configuration options for stylesheet processing
#[derive(Debug, Clone, Default)]
pub struct CssPluginOptions {
    /// Minify transformed stylesheet text with lightningcss before it is
    /// embedded in the bundle.
    ///
    /// Text lightningcss cannot print (e.g. SCSS syntax) is embedded
    /// unminified instead of failing the build.
    pub minify: bool,
}

impl CssPluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }
}
