//! Page generation.
//!
//! Orchestrates the pipeline for one documentation page: fetch the source
//! markdown, split it into sections, build render models, and write one
//! HTML file per section plus a small metadata sidecar.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── docs-introduction.html        # One file per level-2 section
//! ├── docs-getting-started.html
//! ├── docs-usage.html
//! └── .pagesmith-netsuke-meta.json  # First filename, for the docs index
//! ```
//!
//! Every section page carries the full sidebar navigation for its sibling
//! sections, so the files are self-contained and relocatable as a group.
//!
//! The generator is split in two layers: [`generate_page`] drives the
//! network fetch, [`generate_from_document`] is pure file output given a
//! fetched document and is what the tests exercise.

use crate::config::PageConfig;
use crate::fetch::{self, FetchError, FetchedDocument};
use crate::links::GitHubLinkRewriter;
use crate::model::{SectionModel, build_section_model};
use crate::render::{HtmlRenderer, LinkRewrite};
use crate::sections::parse_sections;
use crate::templates::{NavEntry, NavGroup, PageChrome, render_section_page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("document at {0} has no sections to render")]
    EmptyDocument(String),
}

/// Command-line overrides applied on top of the page configuration.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub source_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// What one generation run produced.
#[derive(Debug, Clone)]
pub struct PageArtifacts {
    /// Section pages in document order.
    pub files: Vec<PathBuf>,
    /// Metadata sidecar, `None` when writing it failed.
    pub meta_path: Option<PathBuf>,
    /// The URL the markdown was (or would be) fetched from.
    pub source_url: String,
}

/// Sidecar describing a generated page set. The docs index reads this to
/// find the entry file without guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub first_file: String,
}

/// Sidecar filename for a page key.
pub fn meta_filename(key: &str) -> String {
    format!(".pagesmith-{key}-meta.json")
}

/// Fetch a page's source document and generate its section pages.
pub fn generate_page(
    page: &PageConfig,
    options: &GenerateOptions,
) -> Result<PageArtifacts, GenerateError> {
    let source_url = fetch::resolve_source_url(page, options.source_url.as_deref());
    let document = fetch::fetch_markdown(&source_url)?;
    generate_from_document(page, &document, &source_url, options.output_dir.as_deref())
}

/// Generate section pages from an already fetched document.
pub fn generate_from_document(
    page: &PageConfig,
    document: &FetchedDocument,
    source_url: &str,
    output_dir_override: Option<&Path>,
) -> Result<PageArtifacts, GenerateError> {
    let sections = parse_sections(&document.body);
    if sections.is_empty() {
        return Err(GenerateError::EmptyDocument(source_url.to_string()));
    }

    let rewriter = GitHubLinkRewriter::from_page(page)
        .map(|rewriter| Box::new(rewriter) as Box<dyn LinkRewrite>);
    let renderer = HtmlRenderer::with_link_rewriter(&page.highlight_style, rewriter);
    let highlight_css = renderer.stylesheet();

    let models: Vec<SectionModel> = sections
        .iter()
        .map(|section| build_section_model(section, &page.layout_for(&section.slug), &renderer))
        .collect();

    let output_dir = output_dir_override.unwrap_or(&page.output_dir);
    fs::create_dir_all(output_dir)?;

    let version = page.latest_release.as_deref().map(format_version);
    let updated = format_updated(resolve_updated_at(page, document.last_modified.as_deref()));

    let mut files = Vec::with_capacity(models.len());
    for model in &models {
        let groups = nav_groups(&models, &page.filename_prefix, &model.slug);
        let chrome = PageChrome {
            theme: &page.theme,
            label: &page.label,
            source_url,
            source_label: &page.source_label,
            version: version.as_deref(),
            updated: &updated,
            footer_note: &page.footer_note,
            nav_groups: &groups,
        };
        let title = format!(
            "{} — {} | {}",
            page.theme.site_name, model.short_title, page.page_title_suffix
        );
        let html = render_section_page(&chrome, model, &title, &highlight_css);
        let path = output_dir.join(section_filename(&page.filename_prefix, &model.slug));
        fs::write(&path, html.into_string())?;
        files.push(path);
    }

    let meta_path = write_page_meta(output_dir, &page.key, &files);

    Ok(PageArtifacts {
        files,
        meta_path,
        source_url: source_url.to_string(),
    })
}

fn section_filename(prefix: &str, slug: &str) -> String {
    format!("{prefix}{slug}.html")
}

/// One nav group per section, each linking its own file; subsection links
/// reuse the table-of-contents anchors. Exactly one group is active.
fn nav_groups(models: &[SectionModel], prefix: &str, active_slug: &str) -> Vec<NavGroup> {
    models
        .iter()
        .map(|model| {
            let href = section_filename(prefix, &model.slug);
            let entries = model
                .toc
                .iter()
                .map(|item| NavEntry {
                    label: clean_nav_label(&item.label),
                    href: format!("{href}#{}", item.anchor),
                })
                .collect();
            NavGroup {
                title: clean_nav_label(&model.short_title),
                active: model.slug == active_slug,
                entries,
                href,
            }
        })
        .collect()
}

/// Trim whitespace and trailing colons; headings often end in `:` which
/// reads poorly as a nav label.
fn clean_nav_label(label: &str) -> String {
    label.trim().trim_end_matches(':').trim().to_string()
}

fn format_version(release: &str) -> String {
    format!("Version {}", release.trim_start_matches(['v', 'V']))
}

/// Best available freshness signal: release publish date, then the HTTP
/// `Last-Modified` header, then the time of generation.
fn resolve_updated_at(page: &PageConfig, last_modified: Option<&str>) -> DateTime<Utc> {
    if let Some(published) = page.latest_release_published_at {
        return published;
    }
    if let Some(raw) = last_modified {
        if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
            return parsed.with_timezone(&Utc);
        }
    }
    Utc::now()
}

fn format_updated(at: DateTime<Utc>) -> String {
    format!("Updated {}", at.format("%b %d, %Y"))
}

/// Write the metadata sidecar. Failures are downgraded to a warning; the
/// sidecar only speeds up index discovery and the pages themselves are
/// already on disk.
fn write_page_meta(output_dir: &Path, key: &str, files: &[PathBuf]) -> Option<PathBuf> {
    let first_file = files
        .first()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())?;
    let meta = PageMeta { first_file };
    let path = output_dir.join(meta_filename(key));
    let payload = match serde_json::to_string_pretty(&meta) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("warning: could not encode page metadata for '{key}': {err}");
            return None;
        }
    };
    match fs::write(&path, payload) {
        Ok(()) => Some(path),
        Err(err) => {
            eprintln!("warning: could not write page metadata for '{key}': {err}");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
