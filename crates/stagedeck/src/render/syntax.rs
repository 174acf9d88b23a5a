use std::collections::HashMap;

use eframe::egui::{self, Color32, FontId, text::LayoutJob};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::warn;

/// Syntax highlighter with per-theme caching of laid-out jobs.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    cache: HashMap<(String, Option<String>, &'static str), LayoutJob>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
            cache: HashMap::new(),
        }
    }

    /// Highlight `code` at font size 1.0. Callers scale the job's sections.
    pub fn job(
        &mut self,
        code: &str,
        language: Option<&str>,
        theme_name: &'static str,
        fallback: Color32,
    ) -> LayoutJob {
        let key = (code.to_string(), language.map(str::to_string), theme_name);
        if let Some(job) = self.cache.get(&key) {
            return job.clone();
        }
        let job = self.highlight(code, language, theme_name, fallback);
        self.cache.insert(key, job.clone());
        job
    }

    fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        theme_name: &str,
        fallback: Color32,
    ) -> LayoutJob {
        let font = FontId::monospace(1.0);
        let mut job = LayoutJob::default();

        let syntax = language
            .and_then(|l| self.syntaxes.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let Some(theme) = self.themes.themes.get(theme_name) else {
            job.append(code, 0.0, plain(font, fallback));
            return job;
        };

        let mut lines = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            match lines.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        let fg = style.foreground;
                        let color = Color32::from_rgba_unmultiplied(fg.r, fg.g, fg.b, fg.a);
                        job.append(text, 0.0, plain(font.clone(), color));
                    }
                }
                Err(e) => {
                    warn!("Syntax highlighting failed: {e}");
                    job.append(line, 0.0, plain(font.clone(), fallback));
                }
            }
        }
        job
    }
}

fn plain(font_id: FontId, color: Color32) -> egui::TextFormat {
    egui::TextFormat {
        font_id,
        color,
        ..Default::default()
    }
}

/// Copy of `job` with every section's font resized to `size`.
pub fn sized(mut job: LayoutJob, size: f32, wrap_width: f32) -> LayoutJob {
    for section in &mut job.sections {
        section.format.font_id.size = size;
    }
    job.wrap.max_width = wrap_width;
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_keeps_text() {
        let mut hl = Highlighter::new();
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let job = hl.job(code, Some("rust"), "base16-ocean.dark", Color32::WHITE);
        assert_eq!(job.text, code);
        assert!(job.sections.len() > 3);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let mut hl = Highlighter::new();
        let job = hl.job("x = 1", Some("nope"), "InspiredGitHub", Color32::WHITE);
        assert_eq!(job.text, "x = 1");
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let mut hl = Highlighter::new();
        let job = hl.job("x", None, "missing-theme", Color32::RED);
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.sections[0].format.color, Color32::RED);
    }

    #[test]
    fn test_sized() {
        let mut hl = Highlighter::new();
        let job = hl.job("a\nb", None, "InspiredGitHub", Color32::WHITE);
        let job = sized(job, 24.0, 300.0);
        assert!(job.sections.iter().all(|s| s.format.font_id.size == 24.0));
        assert_eq!(job.wrap.max_width, 300.0);
    }
}
