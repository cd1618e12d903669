//! # Markup Rendering
//!
//! Post content is untrusted markdown that may embed raw HTML. Rendering is a
//! fixed two-stage pipeline:
//!
//! 1. **Parse** with pulldown-cmark (CommonMark, tables, strikethrough). Raw
//!    HTML in the source passes through this stage untouched.
//! 2. **Sanitize** the parser output with ammonia's allow-list, which drops
//!    `<script>`, event-handler attributes, `javascript:` URLs and every other
//!    executable vector.
//!
//! The only way to obtain a [`SafeHtml`] is through [`sanitize`], so parser
//! output cannot reach a display layer without passing stage 2.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use std::fmt;

static SANITIZER: Lazy<ammonia::Builder<'static>> = Lazy::new(|| {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tag_attributes("code", &["class"])
        .link_rel(Some("noopener noreferrer"));
    builder
});

/// HTML that has been through the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const MAX_CLEAN_PASSES: usize = 8;

/// Runs arbitrary HTML through the allow-list.
///
/// The tree builder re-parents misnested elements, so one pass is not always
/// stable. Cleaning repeats until the output stops changing.
pub fn sanitize(html: &str) -> SafeHtml {
    let mut current = SANITIZER.clean(html).to_string();
    for _ in 1..MAX_CLEAN_PASSES {
        let next = SANITIZER.clean(&current).to_string();
        if next == current {
            break;
        }
        current = next;
    }
    SafeHtml(current)
}

/// Stateless markdown-to-safe-HTML renderer.
#[derive(Debug, Clone, Copy)]
pub struct MarkupRenderer {
    options: Options,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }

    /// Renders markdown to sanitized HTML.
    ///
    /// Never fails: pulldown-cmark accepts any input and renders whatever
    /// structure it can recognise.
    pub fn render(&self, markup: &str) -> SafeHtml {
        let parser = Parser::new_ext(markup, self.options);
        let mut raw = String::with_capacity(markup.len() + markup.len() / 2);
        html::push_html(&mut raw, parser);
        sanitize(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markup: &str) -> String {
        MarkupRenderer::new().render(markup).into_string()
    }

    #[test]
    fn renders_heading_and_paragraph() {
        let html = render("# Hi\nBody text.");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<p>Body text.</p>"));
    }

    #[test]
    fn renders_all_heading_levels() {
        let html = render("# 1\n## 2\n### 3\n#### 4\n##### 5\n###### 6\n");
        for level in 1..=6 {
            assert!(html.contains(&format!("<h{0}>{0}</h{0}>", level)), "{}", html);
        }
    }

    #[test]
    fn renders_fenced_code_with_language_class() {
        let html = render("```javascript\nconsole.log('Hello, World!');\n```\n");
        assert!(html.contains("<pre><code class=\"language-javascript\">"), "{}", html);
        assert!(html.contains("console.log"));
    }

    #[test]
    fn renders_inline_code_and_emphasis() {
        let html = render("Use `cargo` for **bold** and *italic*.");
        assert!(html.contains("<code>cargo</code>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn renders_lists_quotes_and_tables() {
        let html = render("- one\n- two\n\n> quoted\n\n| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn links_get_rel_and_keep_href() {
        let html = render("[site](https://example.com)");
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn images_survive() {
        let html = render("![alt text](https://example.com/a.png)");
        assert!(html.contains("<img"));
        assert!(html.contains("src=\"https://example.com/a.png\""));
    }

    #[test]
    fn strips_script_elements() {
        let html = render("<script>alert(1)</script>");
        assert!(!html.to_lowercase().contains("<script"));
        assert!(!html.contains("alert(1)"));
    }

    #[test]
    fn strips_event_handlers() {
        let html = render("<img src=\"x.png\" onerror=\"alert(1)\">\n\n<p onclick=\"evil()\">hi</p>");
        assert!(!html.contains("onerror"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn strips_javascript_urls() {
        let md = render("[click](javascript:alert(1))");
        assert!(!md.contains("javascript:"));

        let raw = render("<a href=\"JaVaScRiPt:alert(1)\">x</a>");
        assert!(!raw.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn strips_iframes_and_styles() {
        let html = render("<iframe src=\"https://evil.test\"></iframe><style>body{}</style>text");
        assert!(!html.contains("<iframe"));
        assert!(!html.contains("<style"));
        assert!(!html.contains("body{}"));
    }

    #[test]
    fn sanitize_is_idempotent_on_rendered_output() {
        let inputs = [
            "# Hi\nBody text.",
            "Text with <b onclick=\"x()\">bold</b> and [a](https://a.test)",
            "```rust\nfn main() {}\n```",
            "| a | b |\n|:--|--:|\n| 1 | 2 |",
            "<div><span>unclosed",
            "> quote & \"quotes\" <3",
            "<select><option>a<table>",
        ];
        for input in inputs {
            let rendered = MarkupRenderer::new().render(input);
            assert_eq!(sanitize(rendered.as_str()), rendered, "input: {}", input);
        }
    }

    #[test]
    fn misnested_table_settles_after_one_call() {
        let rendered = MarkupRenderer::new().render("<select><option>a<table>");
        let once = sanitize(rendered.as_str());
        assert_eq!(once, rendered);
        assert_eq!(sanitize(once.as_str()), once);
        assert!(rendered.as_str().contains("<table>"));
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let html = render("**unclosed *emph [link](\n```\nno close fence\n<div");
        assert!(html.contains("no close fence"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert!(MarkupRenderer::new().render("").is_empty());
    }
}
