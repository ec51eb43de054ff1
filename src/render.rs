//! Markdown-to-HTML conversion with syntax highlighting.
//!
//! Rendering is a staged pipeline: normalize fenced blocks, convert via
//! [pulldown-cmark](https://docs.rs/pulldown-cmark) with tables enabled,
//! and replace every code block event with a highlighted
//! `<div class="codehilite" data-language="...">` wrapper produced by
//! [syntect](https://docs.rs/syntect).
//!
//! ## Normalization
//!
//! Upstream documents often indent fences 1-3 spaces under list items,
//! which markdown converters treat inconsistently. The delimiter lines are
//! un-indented to column zero before conversion so fences always open a
//! code block. Fence info strings may carry comma-separated annotations
//! (`rust,no_run`); only the token before the first comma counts as the
//! language.
//!
//! ## Highlighting
//!
//! Highlighted output uses CSS classes (`hl-` prefixed) rather than inline
//! styles; [`HtmlRenderer::stylesheet`] returns the matching CSS for the
//! configured theme. A declared language with no matching syntax falls
//! back to the plain-text syntax while `data-language` keeps the declared
//! name.
//!
//! ## Link rewriting
//!
//! An optional [`LinkRewrite`] strategy is consulted for every anchor
//! target; `None` leaves the target untouched. The renderer itself knows
//! nothing about URL schemes or repositories.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html as md_html};
use regex::Regex;
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Strategy for rewriting anchor targets during markdown conversion.
pub trait LinkRewrite {
    /// Return the replacement target, or `None` to leave the link as-is.
    fn rewrite(&self, target: &str) -> Option<String>;
}

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Theme used when the configured name is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

fn indented_fence_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ ]{1,3}([`~]{3,})").expect("fence pattern compiles"))
}

/// Renders markdown fragments and standalone code snippets with a shared
/// highlighting theme.
pub struct HtmlRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    link_rewriter: Option<Box<dyn LinkRewrite>>,
}

impl HtmlRenderer {
    /// Build a renderer for the given theme name with no link rewriting.
    pub fn new(style: &str) -> Self {
        Self::with_link_rewriter(style, None)
    }

    /// Build a renderer with an optional link-rewriting strategy. Unknown
    /// theme names fall back to [`DEFAULT_THEME`].
    pub fn with_link_rewriter(style: &str, link_rewriter: Option<Box<dyn LinkRewrite>>) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes
            .remove(style)
            .or_else(|| themes.remove(DEFAULT_THEME))
            .unwrap_or_default();
        HtmlRenderer {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            link_rewriter,
        }
    }

    /// CSS rules for the highlighted-code classes of the configured theme.
    pub fn stylesheet(&self) -> String {
        css_for_theme_with_class_style(&self.theme, CLASS_STYLE).unwrap_or_default()
    }

    /// Convert a markdown fragment to HTML. Empty or whitespace-only input
    /// renders to an empty string with no wrapper markup.
    pub fn markdown(&self, text: &str) -> String {
        let normalized = normalize_fenced_blocks(text);
        if normalized.trim().is_empty() {
            return String::new();
        }

        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);

        let mut events = Vec::new();
        let mut code_buf = String::new();
        let mut fence_lang: Option<String> = None;
        let mut in_code_block = false;
        for event in Parser::new_ext(&normalized, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_buf.clear();
                    fence_lang = match &kind {
                        CodeBlockKind::Fenced(info) => fence_language(info),
                        CodeBlockKind::Indented => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let block = self.code_block(&code_buf, fence_lang.take().as_deref());
                    events.push(Event::Html(block.into()));
                }
                Event::Text(text) if in_code_block => code_buf.push_str(&text),
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = match self.rewrite_target(&dest_url) {
                        Some(rewritten) => rewritten.into(),
                        None => dest_url,
                    };
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    }));
                }
                other => events.push(other),
            }
        }

        let mut html = String::new();
        md_html::push_html(&mut html, events.into_iter());
        html
    }

    /// Render a standalone code snippet as a highlighted block.
    ///
    /// The `data-language` attribute always carries the declared language
    /// (default `"text"`), even when no matching syntax exists and the
    /// plain-text fallback does the highlighting.
    pub fn code_block(&self, code: &str, language: Option<&str>) -> String {
        let lang = match language {
            Some(l) if !l.is_empty() => l,
            _ => "text",
        };
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        format!(
            "<div class=\"codehilite\" data-language=\"{}\"><pre><code>{}</code></pre></div>\n",
            escape_attribute(lang),
            self.highlight(code, syntax)
        )
    }

    fn highlight(&self, code: &str, syntax: &SyntaxReference) -> String {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if generator
                .parse_html_for_line_which_includes_newline(line)
                .is_err()
            {
                return escape_html(code);
            }
        }
        generator.finalize()
    }

    fn rewrite_target(&self, target: &str) -> Option<String> {
        self.link_rewriter.as_ref()?.rewrite(target)
    }
}

/// Language token of a fence info string: the part before the first comma,
/// first whitespace-separated word. `None` when the fence is bare.
fn fence_language(info: &str) -> Option<String> {
    let token = info
        .split(',')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .next()
        .unwrap_or("");
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Move fence delimiters indented 1-3 spaces back to column zero so the
/// converter reliably opens a code block for them.
fn normalize_fenced_blocks(text: &str) -> String {
    indented_fence_pattern().replace_all(text, "$1").into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(text: &str) -> String {
    escape_html(text).replace('"', "&quot;").replace('\'', "&#x27;")
}
