//! HTML templates.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping; the
//! pre-rendered markdown fragments carried by the section model are spliced
//! in with `PreEscaped`.
//!
//! Two page kinds exist: the section page (sidebar, hero, meta list, one
//! section body laid out by its device) and the docs index (card per page).
//! Styling is embedded at compile time from `static/doc.css`, followed by
//! the syntax highlighting stylesheet for the page's theme.

use crate::config::{Device, ThemeConfig};
use crate::model::SectionModel;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const DOC_CSS: &str = include_str!("../static/doc.css");

/// One sidebar group: a section link plus its subsection anchors.
#[derive(Debug, Clone)]
pub struct NavGroup {
    pub title: String,
    pub href: String,
    /// True for the group of the section being rendered.
    pub active: bool,
    pub entries: Vec<NavEntry>,
}

#[derive(Debug, Clone)]
pub struct NavEntry {
    pub label: String,
    pub href: String,
}

/// Everything shared by all section pages of one documentation page.
#[derive(Debug, Clone, Copy)]
pub struct PageChrome<'a> {
    pub theme: &'a ThemeConfig,
    pub label: &'a str,
    pub source_url: &'a str,
    pub source_label: &'a str,
    /// Display string like `Version 1.2.3`, absent for unreleased sources.
    pub version: Option<&'a str>,
    /// Display string like `Updated Oct 09, 2025`.
    pub updated: &'a str,
    pub footer_note: &'a str,
    pub nav_groups: &'a [NavGroup],
}

/// One card on the docs index.
#[derive(Debug, Clone, Default)]
pub struct IndexEntry {
    pub label: String,
    pub href: String,
    pub description_html: String,
    pub repo_url: Option<String>,
    pub release_label: Option<String>,
    pub release_url: Option<String>,
    pub package_url: Option<String>,
    pub package_label: Option<String>,
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the sidebar: site identity plus one nav group per section
fn sidebar(chrome: &PageChrome) -> Markup {
    html! {
        aside.doc-sidebar {
            div.doc-sidebar__body {
                p.doc-sidebar__eyebrow { (chrome.theme.hero_eyebrow) }
                p.doc-sidebar__site { (chrome.theme.site_name) }
                p.doc-sidebar__label { (chrome.label) " " (chrome.theme.doc_label) }
                nav.doc-sidebar__groups {
                    @for group in chrome.nav_groups {
                        section.doc-nav-group {
                            a.doc-nav-group__title.is-active[group.active] href=(group.href) {
                                (group.title)
                            }
                            @if !group.entries.is_empty() {
                                ul.doc-nav__list {
                                    @for entry in &group.entries {
                                        li { a href=(entry.href) { (entry.label) } }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the page hero for a section
fn hero(chrome: &PageChrome, model: &SectionModel) -> Markup {
    html! {
        header.doc-hero {
            p.doc-hero__eyebrow { (chrome.theme.doc_label) }
            h1.doc-hero__title { (model.title) }
            @if !chrome.theme.hero_tagline.is_empty() {
                p.doc-hero__tagline { (chrome.theme.hero_tagline) }
            }
        }
    }
}

/// Renders the version/updated/source meta strip
fn meta_list(chrome: &PageChrome) -> Markup {
    html! {
        ul.doc-meta-list {
            @if let Some(version) = chrome.version {
                li.doc-meta-list__item { (version) }
            }
            li.doc-meta-list__item { (chrome.updated) }
            li.doc-meta-list__item {
                a href=(chrome.source_url) target="_blank" rel="noopener" {
                    (chrome.source_label)
                }
            }
        }
    }
}

/// Renders the in-page table of contents
fn toc(model: &SectionModel) -> Markup {
    html! {
        @if !model.toc.is_empty() {
            nav.doc-toc aria-label="On this page" {
                p.doc-toc__heading { "On this page" }
                ul.doc-toc__list {
                    @for item in &model.toc {
                        li { a href={ "#" (item.anchor) } { (item.label) } }
                    }
                }
            }
        }
    }
}

/// Renders the section body according to its resolved device
fn article(model: &SectionModel) -> Markup {
    html! {
        article.doc-article {
            @match model.device {
                Device::NumberedSteps => {
                    @if !model.intro_html.is_empty() {
                        div.doc-article__intro { (PreEscaped(&model.intro_html)) }
                    }
                    ol.doc-steps {
                        @for step in &model.steps {
                            li.doc-steps__item id=(step.anchor) {
                                h3.doc-steps__title { (step.title) }
                                div.doc-steps__body { (PreEscaped(&step.body_html)) }
                            }
                        }
                    }
                }
                Device::SplitPanel => {
                    @if let Some(split) = &model.split {
                        div.doc-split {
                            div.doc-split__prose { (PreEscaped(&split.primary_html)) }
                            div.doc-split__code data-language=(split.language) {
                                (PreEscaped(&split.code_html))
                            }
                        }
                    }
                }
                Device::Default => {
                    @if model.subsections.is_empty() {
                        (PreEscaped(&model.body_html))
                    } @else {
                        @if !model.intro_html.is_empty() {
                            div.doc-article__intro { (PreEscaped(&model.intro_html)) }
                        }
                        @for block in &model.subsections {
                            section.doc-article__subsection id=(block.anchor) {
                                h3 { (block.title) }
                                (PreEscaped(&block.body_html))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn footer(chrome: &PageChrome) -> Markup {
    html! {
        footer.doc-footer {
            @if !chrome.footer_note.is_empty() {
                p.doc-footer__note { (chrome.footer_note) }
            }
            p.doc-footer__site { (chrome.theme.site_name) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one section page
pub fn render_section_page(
    chrome: &PageChrome,
    model: &SectionModel,
    page_title: &str,
    highlight_css: &str,
) -> Markup {
    let css = format!("{}\n\n{}", DOC_CSS, highlight_css);

    let content = html! {
        div.doc-shell {
            (sidebar(chrome))
            main.doc-main {
                (hero(chrome, model))
                (meta_list(chrome))
                (toc(model))
                (article(model))
                (footer(chrome))
            }
        }
    };

    base_document(page_title, &css, Some("doc-page"), content)
}

/// Renders the docs index page
pub fn render_docs_index(theme: &ThemeConfig, entries: &[IndexEntry]) -> Markup {
    let title = format!("{} — {}", theme.site_name, theme.doc_label);

    let content = html! {
        main.doc-index {
            header.doc-hero {
                p.doc-hero__eyebrow { (theme.hero_eyebrow) }
                h1.doc-hero__title { (theme.site_name) " " (theme.doc_label) }
                @if !theme.hero_tagline.is_empty() {
                    p.doc-hero__tagline { (theme.hero_tagline) }
                }
            }
            ul.doc-index__grid {
                @for entry in entries {
                    li.doc-index__card {
                        h2.doc-index__name {
                            a href=(entry.href) { (entry.label) }
                        }
                        div.doc-index__description { (PreEscaped(&entry.description_html)) }
                        ul.doc-index__links {
                            li { a href=(entry.href) { "Documentation" } }
                            @if let Some(repo) = &entry.repo_url {
                                li { a href=(repo) target="_blank" rel="noopener" { "Repository" } }
                            }
                            @if let (Some(url), Some(tag)) = (&entry.release_url, &entry.release_label) {
                                li { a href=(url) target="_blank" rel="noopener" { (tag) } }
                            }
                            @if let (Some(url), Some(label)) = (&entry.package_url, &entry.package_label) {
                                li { a href=(url) target="_blank" rel="noopener" { (label) } }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(&title, DOC_CSS, Some("doc-index-page"), content)
}

// ============================================================================
// Tests
// ============================================================================
