//! Markdown rendering of post bodies with syntax highlighting

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Reading speed used for the reading-time estimate
const WORDS_PER_MINUTE: usize = 200;

/// Default syntect theme for fenced code
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// GitHub-flavoured Markdown renderer
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
}

/// Fenced code block being collected between its start and end events
struct PendingCode {
    lang: Option<String>,
    source: String,
}

impl MarkdownRenderer {
    /// Create a renderer using the default highlight theme
    pub fn new() -> Self {
        // The bundled default themes always include DEFAULT_THEME
        Self::with_theme(DEFAULT_THEME).unwrap_or_else(|_| Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: Theme::default(),
        })
    }

    /// Create a renderer with one of syntect's bundled themes
    pub fn with_theme(name: &str) -> Result<Self> {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(name)
            .ok_or_else(|| anyhow!("unknown highlight theme: {}", name))?;
        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Render a post body to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front matter is stripped before rendering, so metadata blocks stay off
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;

        let mut events: Vec<Event> = Vec::new();
        let mut pending: Option<PendingCode> = None;

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            // Info strings may carry attributes after the language
                            lang.split_whitespace().next().map(str::to_string)
                        }
                        _ => None,
                    };
                    pending = Some(PendingCode {
                        lang,
                        source: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(code) = pending.take() {
                        let block = self.highlight_code(&code.source, code.lang.as_deref());
                        events.push(Event::Html(CowStr::from(block)));
                    }
                }
                Event::Text(text) if pending.is_some() => {
                    if let Some(code) = pending.as_mut() {
                        code.source.push_str(&text);
                    }
                }
                event => {
                    if pending.is_none() {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    /// Highlight a code block, falling back to escaped plain text
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) => format!(
                r#"<div class="highlight" data-lang="{}">{}</div>"#,
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    html_escape(lang),
                    html_escape(code)
                )
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimated reading time in minutes for a Markdown body, never below one
pub fn reading_time_minutes(markdown: &str) -> usize {
    let words = markdown.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"class="highlight""#));
        assert!(html.contains(r#"data-lang="rust""#));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        assert!(MarkdownRenderer::with_theme("no-such-theme").is_err());
    }

    #[test]
    fn test_render_gfm_extensions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n\n~~gone~~")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("checkbox"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_render_hangul_body() {
        let renderer = MarkdownRenderer::new();
        let markdown = "## 회화 MASTER\n\n오늘의 표현\n\n---\n\n다음 표현";
        let html = renderer.render(markdown).unwrap();
        assert!(html.contains("회화 MASTER"));
        assert!(html.contains("<hr />"));
        assert!(html.contains("다음 표현"));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(201)), 2);
    }
}
