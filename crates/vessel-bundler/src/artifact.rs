//! Host document assembly.

use std::path::{Path, PathBuf};

use serde::Serialize;
use vessel_config::OutputMode;

use crate::Result;
use crate::entry::ROOT_ELEMENT_ID;

pub const HTML_FILE: &str = "index.html";
pub const BUNDLE_FILE: &str = "bundle.js";

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Tailwind theme mapping design tokens onto CSS custom properties.
const TAILWIND_CONFIG: &str = r#"tailwind.config = {
        theme: {
          fontFamily: {
            sans: ['geist'],
            mono: ['geist-mono'],
          },
          extend: {
            borderRadius: {
              lg: 'var(--radius)',
              md: 'calc(var(--radius) - 2px)',
              sm: 'calc(var(--radius) - 4px)',
            },
            colors: {
              background: 'hsl(var(--background))',
              foreground: 'hsl(var(--foreground))',
              card: {
                DEFAULT: 'hsl(var(--card))',
                foreground: 'hsl(var(--card-foreground))',
              },
              popover: {
                DEFAULT: 'hsl(var(--popover))',
                foreground: 'hsl(var(--popover-foreground))',
              },
              primary: {
                DEFAULT: 'hsl(var(--primary))',
                foreground: 'hsl(var(--primary-foreground))',
              },
              secondary: {
                DEFAULT: 'hsl(var(--secondary))',
                foreground: 'hsl(var(--secondary-foreground))',
              },
              muted: {
                DEFAULT: 'hsl(var(--muted))',
                foreground: 'hsl(var(--muted-foreground))',
              },
              accent: {
                DEFAULT: 'hsl(var(--accent))',
                foreground: 'hsl(var(--accent-foreground))',
              },
              destructive: {
                DEFAULT: 'hsl(var(--destructive))',
                foreground: 'hsl(var(--destructive-foreground))',
              },
              border: 'hsl(var(--border))',
              input: 'hsl(var(--input))',
              ring: 'hsl(var(--ring))',
              chart: {
                '1': 'hsl(var(--chart-1))',
                '2': 'hsl(var(--chart-2))',
                '3': 'hsl(var(--chart-3))',
                '4': 'hsl(var(--chart-4))',
                '5': 'hsl(var(--chart-5))',
              },
              sidebar: {
                DEFAULT: 'hsl(var(--sidebar-background))',
                foreground: 'hsl(var(--sidebar-foreground))',
                primary: 'hsl(var(--sidebar-primary))',
                'primary-foreground': 'hsl(var(--sidebar-primary-foreground))',
                accent: 'hsl(var(--sidebar-accent))',
                'accent-foreground': 'hsl(var(--sidebar-accent-foreground))',
                border: 'hsl(var(--sidebar-border))',
                ring: 'hsl(var(--sidebar-ring))',
              },
            },
          },
        },
      };"#;

/// Browser builds of UI libraries read `process.env.NODE_ENV`.
const PROCESS_SHIM: &str =
    "window.process = window.process || { env: { NODE_ENV: 'production' } };";

/// Host document plus linked bundle. Both are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub html: String,
    pub js: String,
}

impl Artifact {
    /// Wrap linked bundle text in the host document.
    ///
    /// `Separate` pages load `./bundle.js` once the DOM is ready, `Inlined`
    /// pages embed the bundle in a module script.
    pub fn assemble(js: String, mode: OutputMode) -> Self {
        let html = host_document(&js, mode);
        Self { html, js }
    }

    /// Write `index.html` and `bundle.js` into `dir`, creating it if needed.
    pub async fn persist(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await?;
        let html_path = dir.join(HTML_FILE);
        let js_path = dir.join(BUNDLE_FILE);
        tokio::fs::write(&html_path, &self.html).await?;
        tokio::fs::write(&js_path, &self.js).await?;
        tracing::info!(dir = %dir.display(), "Persisted artifact for inspection");
        Ok(vec![html_path, js_path])
    }
}

fn host_document(js: &str, mode: OutputMode) -> String {
    let bundle_script = match mode {
        OutputMode::Separate => format!(
            "<script type=\"module\">\n      document.addEventListener('DOMContentLoaded', () => {{\n        import('./{BUNDLE_FILE}');\n      }});\n    </script>"
        ),
        OutputMode::Inlined => format!(
            "<script type=\"module\">\n{}\n    </script>",
            escape_inline_script(js)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <script src="{TAILWIND_CDN}"></script>
    <script>
      {TAILWIND_CONFIG}
    </script>
    <script>{PROCESS_SHIM}</script>
  </head>
  <body>
    <div id="{ROOT_ELEMENT_ID}"></div>
    {bundle_script}
  </body>
</html>
"#
    )
}

/// Keep bundle text from closing the surrounding `<script>` element early.
///
/// HTML matches the end tag without regard to letter case.
fn escape_inline_script(js: &str) -> String {
    const CLOSE: &str = "</script";

    let mut out = String::with_capacity(js.len());
    let mut rest = js;
    while let Some(pos) = rest.find("</") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        let closes = tail
            .get(..CLOSE.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(CLOSE));
        out.push_str(if closes { "<\\/" } else { "</" });
        rest = &tail[2..];
    }
    out.push_str(rest);
    out
}
