use std::collections::HashMap;

use tracing::trace;

/// Glyphs available through `:name:` placeholders.
const GLYPHS: &[(&str, &str)] = &[
    ("arrow-right", "\u{27A1}"),
    ("bolt", "\u{26A1}"),
    ("book", "\u{1F4D6}"),
    ("check", "\u{2714}"),
    ("chevron-right", "\u{25B6}"),
    ("chip", "\u{1F4BB}"),
    ("clipboard", "\u{1F4CB}"),
    ("cloud", "\u{2601}"),
    ("code", "\u{1F5B3}"),
    ("copy", "\u{1F5D0}"),
    ("globe", "\u{1F310}"),
    ("heart", "\u{2764}"),
    ("layers", "\u{1F4DA}"),
    ("lock", "\u{1F512}"),
    ("mail", "\u{2709}"),
    ("moon", "\u{1F319}"),
    ("rocket", "\u{1F680}"),
    ("settings", "\u{2699}"),
    ("shield", "\u{1F6E1}"),
    ("star", "\u{2B50}"),
    ("sun", "\u{2600}"),
    ("terminal", "\u{1F5B5}"),
    ("users", "\u{1F465}"),
    ("wrench", "\u{1F527}"),
];

/// Look up the glyph for an icon name.
pub fn glyph(name: &str) -> Option<&'static str> {
    GLYPHS
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| GLYPHS[i].1)
}

/// Replace `:name:` placeholders with glyphs. Unknown names are left as typed.
pub fn materialize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find(':') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_end = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'));
        match name_end {
            Some(end) if end > 0 && after[end..].starts_with(':') => {
                let name = &after[..end];
                match glyph(name) {
                    Some(g) => {
                        out.push_str(g);
                        rest = &after[end + 1..];
                    }
                    None => {
                        out.push(':');
                        rest = after;
                    }
                }
            }
            _ => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Memoised placeholder expansion.
///
/// Strings are expanded on first use and kept until [`IconRenderer::refresh`]
/// is called after the displayed content changes.
#[derive(Default)]
pub struct IconRenderer {
    cache: HashMap<String, String>,
    generation: u64,
}

impl IconRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, raw: &str) -> &str {
        if !self.cache.contains_key(raw) {
            self.cache.insert(raw.to_string(), materialize(raw));
        }
        self.cache.get(raw).map(String::as_str).unwrap_or_default()
    }

    pub fn refresh(&mut self) {
        self.cache.clear();
        self.generation += 1;
        trace!(generation = self.generation, "icons refreshed");
    }

    /// Number of refreshes so far.
    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_table_sorted() {
        assert!(GLYPHS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_known_placeholder() {
        assert_eq!(materialize(":check: Copied!"), "\u{2714} Copied!");
        assert_eq!(materialize("a :sun::moon: b"), "a \u{2600}\u{1F319} b");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(materialize(":nope: here"), ":nope: here");
    }

    #[test]
    fn test_plain_colons_untouched() {
        assert_eq!(materialize("ratio 16:9"), "ratio 16:9");
        assert_eq!(materialize("key: value"), "key: value");
        assert_eq!(materialize("::"), "::");
        assert_eq!(materialize("trailing:"), "trailing:");
    }

    #[test]
    fn test_refresh_clears_cache() {
        let mut icons = IconRenderer::new();
        assert_eq!(icons.text(":rocket: Launch"), "\u{1F680} Launch");
        assert_eq!(icons.cached(), 1);
        icons.refresh();
        assert_eq!(icons.cached(), 0);
        assert_eq!(icons.generation(), 1);
    }
}
