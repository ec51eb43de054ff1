//! Structural parsing of upstream markdown into sections and subsections.
//!
//! A source document is split on level-2 headings (`## Title`); each
//! section's body is further split on level-3 headings (`### Title`).
//! Lines that consist solely of a bold phrase (`**Capabilities**`) are
//! promoted to synthetic level-3 headings first, so stylistic emphasis
//! headings become navigable subsections.
//!
//! ## Slugs
//!
//! Every section gets a URL-safe slug derived from its heading: lowercase,
//! leading `1.`-style numbering dropped, non-alphanumeric runs collapsed to
//! single hyphens. Slugs are unique per document; collisions get a numeric
//! suffix (`install`, `install-2`, ...). The same uniqueness routine is
//! reused for subsection anchors, scoped per section rather than per
//! document.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn section_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^##\s+(.*)").expect("section pattern compiles"))
}

fn subsection_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^###\s+(.*)").expect("subsection pattern compiles"))
}

fn bold_heading_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\*\*(.+?)\*\*\s*$").expect("bold pattern compiles"))
}

fn number_prefix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.?\s*").expect("number prefix pattern compiles"))
}

/// A level-3 heading block (or promoted bold line) inside a section.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsection {
    pub title: String,
    /// Body text below the heading, trimmed. Excludes the heading line.
    pub markdown: String,
}

/// One level-2 heading block from the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Full heading text, numeric prefix included (e.g. "1. Introduction").
    pub title: String,
    /// Heading with the leading `1.`-style prefix removed. Falls back to
    /// the full heading when stripping would leave nothing.
    pub short_title: String,
    /// Document-unique, URL-safe identifier.
    pub slug: String,
    /// 1-based position in the document.
    pub order: usize,
    /// Trimmed body text excluding the heading line. Bold lines are kept
    /// as written here; promotion only affects subsection splitting.
    pub markdown: String,
    /// Body text preceding the first subsection, trimmed. Equals the whole
    /// body when the section has no subsections.
    pub intro_markdown: String,
    pub subsections: Vec<Subsection>,
}

/// Strip backslash escapes and surrounding whitespace from heading text.
fn clean_heading(text: &str) -> String {
    text.replace('\\', "").trim().to_string()
}

/// Derive a URL-safe slug from a heading title.
///
/// - `"1. Getting Started"` → `"getting-started"`
/// - `"API & Internals"` → `"api-internals"`
/// - `"!!!"` → `"section"` (fallback when nothing survives)
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let no_number = number_prefix_pattern().replace(&lowered, "");
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let non_alnum =
        NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("alnum pattern compiles"));
    let slug = non_alnum.replace_all(&no_number, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}

/// Return `base` unless it is already taken, otherwise `base-2`, `base-3`,
/// ... until free. The winning value is recorded in `used`.
pub fn unique_slug(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Rewrite whole-line bold phrases into `### ` headings. Lines whose bold
/// text is empty are left untouched.
fn promote_bold_headings(body: &str) -> String {
    bold_heading_pattern()
        .replace_all(body, |caps: &regex::Captures<'_>| {
            let title = caps[1].trim();
            if title.is_empty() {
                caps[0].to_string()
            } else {
                format!("### {title}")
            }
        })
        .into_owned()
}

/// Split a section body into its intro text and subsection list.
fn split_subsections(body: &str) -> (String, Vec<Subsection>) {
    let body = promote_bold_headings(body);
    let matches: Vec<_> = subsection_pattern().captures_iter(&body).collect();
    if matches.is_empty() {
        return (body.trim().to_string(), Vec::new());
    }

    let first_start = matches[0].get(0).map(|m| m.start()).unwrap_or(0);
    let intro = body[..first_start].trim().to_string();
    let mut subsections = Vec::with_capacity(matches.len());
    for (idx, caps) in matches.iter().enumerate() {
        let whole = caps.get(0).expect("capture group 0 always present");
        let start = whole.end();
        let end = matches
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(body.len());
        let chunk = body[start..end].trim().to_string();
        subsections.push(Subsection {
            title: clean_heading(&caps[1]),
            markdown: chunk,
        });
    }
    (intro, subsections)
}

/// Split the upstream markdown document into ordered sections.
///
/// Returns an empty vec when the document has no level-2 headings; callers
/// treat that as "nothing to render" and abort the page.
pub fn parse_sections(markdown_text: &str) -> Vec<Section> {
    let entries: Vec<_> = section_pattern().captures_iter(markdown_text).collect();
    if entries.is_empty() {
        return Vec::new();
    }

    let mut sections = Vec::with_capacity(entries.len());
    let mut used_slugs = HashSet::new();
    for (idx, caps) in entries.iter().enumerate() {
        let whole = caps.get(0).expect("capture group 0 always present");
        let start = whole.end();
        let end = entries
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(markdown_text.len());
        let body = markdown_text[start..end].trim().to_string();
        let heading = clean_heading(&caps[1]);
        let short_title = number_prefix_pattern()
            .replace(&heading, "")
            .trim()
            .to_string();
        let slug = unique_slug(&slugify(&heading), &mut used_slugs);
        let (intro, subsections) = split_subsections(&body);
        sections.push(Section {
            short_title: if short_title.is_empty() {
                heading.clone()
            } else {
                short_title
            },
            title: heading,
            slug,
            order: idx + 1,
            markdown: body,
            intro_markdown: intro,
            subsections,
        });
    }
    sections
}
