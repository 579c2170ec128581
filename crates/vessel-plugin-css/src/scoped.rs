//! Class-name scoping for `*.module.css` stylesheets.
//!
//! Every class selector token `.name` in a rule prelude is rewritten to
//! `.name_<suffix>` where the suffix comes from an [`IdSource`]. Declaration
//! values, at-rule preludes, strings, comments and attribute selectors are
//! copied verbatim, so `url(a.png)` or `@media (min-width: 37.5em)` are
//! never touched.

use indexmap::IndexMap;

use crate::ids::IdSource;

/// Length of the suffix appended to scoped class names.
pub const SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedStylesheet {
    pub css: String,
    /// Original class name → rewritten class name, in first-seen order.
    pub class_map: IndexMap<String, String>,
}

/// Rewrite the class selectors of one stylesheet.
///
/// Repeated occurrences of a class within the file share one rewritten name.
pub fn scope_class_names(css: &str, ids: &dyn IdSource) -> ScopedStylesheet {
    let mut scoper = Scoper {
        ids,
        class_map: IndexMap::new(),
    };
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    let mut segment = String::new();
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                segment.push_str("/*");
                copy_comment(&mut chars, &mut segment);
            }
            '"' | '\'' => {
                segment.push(c);
                copy_string(c, &mut chars, &mut segment);
            }
            '{' => {
                if segment.trim_start().starts_with('@') {
                    out.push_str(&segment);
                } else {
                    out.push_str(&scoper.rewrite_prelude(&segment));
                }
                out.push('{');
                segment.clear();
            }
            ';' | '}' => {
                out.push_str(&segment);
                out.push(c);
                segment.clear();
            }
            _ => segment.push(c),
        }
    }
    out.push_str(&segment);

    ScopedStylesheet {
        css: out,
        class_map: scoper.class_map,
    }
}

struct Scoper<'a> {
    ids: &'a dyn IdSource,
    class_map: IndexMap<String, String>,
}

impl Scoper<'_> {
    fn scoped_name(&mut self, class: &str) -> String {
        if let Some(existing) = self.class_map.get(class) {
            return existing.clone();
        }
        let scoped = format!("{}_{}", class, self.ids.next_id(SUFFIX_LEN));
        self.class_map.insert(class.to_string(), scoped.clone());
        scoped
    }

    fn rewrite_prelude(&mut self, prelude: &str) -> String {
        let mut out = String::with_capacity(prelude.len() + 16);
        let mut chars = prelude.chars().peekable();
        let mut bracket_depth = 0usize;

        while let Some(c) = chars.next() {
            match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("/*");
                    copy_comment(&mut chars, &mut out);
                }
                '"' | '\'' => {
                    out.push(c);
                    copy_string(c, &mut chars, &mut out);
                }
                '\\' => {
                    out.push(c);
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '[' => {
                    bracket_depth += 1;
                    out.push(c);
                }
                ']' => {
                    bracket_depth = bracket_depth.saturating_sub(1);
                    out.push(c);
                }
                '.' if bracket_depth == 0 && chars.peek().is_some_and(|n| is_ident_start(*n)) => {
                    let mut class = String::new();
                    while let Some(&next) = chars.peek() {
                        if is_ident_char(next) {
                            class.push(next);
                            chars.next();
                        } else if next == '\\' {
                            class.push(next);
                            chars.next();
                            if let Some(escaped) = chars.next() {
                                class.push(escaped);
                            }
                        } else {
                            break;
                        }
                    }
                    out.push('.');
                    out.push_str(&self.scoped_name(&class));
                }
                _ => out.push(c),
            }
        }

        out
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn copy_comment(chars: &mut impl Iterator<Item = char>, out: &mut String) {
    let mut prev = '\0';
    for c in chars {
        out.push(c);
        if prev == '*' && c == '/' {
            return;
        }
        prev = c;
    }
}

fn copy_string(quote: char, chars: &mut impl Iterator<Item = char>, out: &mut String) {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else if c == quote {
            return;
        }
    }
}
