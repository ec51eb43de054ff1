//! Docs index generation.
//!
//! Builds the landing page that lists every configured documentation page
//! with a short description and outbound links (repository, release,
//! package registry).
//!
//! Each card needs an entry file to link to. The generator leaves a
//! metadata sidecar naming the first section file; when the sidecar is
//! missing or stale the output directory is scanned instead, preferring
//! `introduction` and `getting-started` sections over the rest. Pages with
//! no discoverable file are left off the index entirely rather than
//! linking into a 404.

use crate::config::{PageConfig, SiteConfig};
use crate::generate::{PageMeta, meta_filename};
use crate::render::{DEFAULT_THEME, HtmlRenderer};
use crate::templates::{IndexEntry, render_docs_index};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What writing the index produced.
#[derive(Debug, Clone)]
pub struct IndexArtifacts {
    pub path: PathBuf,
    /// Pages that made it onto the index.
    pub listed: usize,
}

/// Render and write the docs index for a site.
pub fn write_docs_index(site: &SiteConfig) -> Result<IndexArtifacts, IndexError> {
    let renderer = HtmlRenderer::new(DEFAULT_THEME);
    let entries = build_index_entries(site, &renderer);
    let html = render_docs_index(&site.theme, &entries);
    if let Some(parent) = site.docs_index_output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&site.docs_index_output, html.into_string())?;
    Ok(IndexArtifacts {
        path: site.docs_index_output.clone(),
        listed: entries.len(),
    })
}

/// One index card per page with a discoverable entry file, in declaration
/// order.
pub fn build_index_entries(site: &SiteConfig, renderer: &HtmlRenderer) -> Vec<IndexEntry> {
    site.pages
        .values()
        .filter_map(|page| build_entry(page, renderer))
        .collect()
}

fn build_entry(page: &PageConfig, renderer: &HtmlRenderer) -> Option<IndexEntry> {
    let href = sidecar_first_file(&page.output_dir, &page.key)
        .or_else(|| discover_first_file(&page.output_dir, &page.filename_prefix))?;

    let description = page
        .description
        .clone()
        .unwrap_or_else(|| format!("Reference docs for {}.", page.label));

    let repo_url = page
        .repo
        .as_ref()
        .map(|repo| format!("https://github.com/{repo}"));
    let release_url = match (&page.repo, &page.latest_release) {
        (Some(repo), Some(tag)) => Some(format!("https://github.com/{repo}/releases/tag/{tag}")),
        _ => None,
    };
    let (package_url, package_label) = match package_link(page) {
        Some((url, label)) => (Some(url), Some(label.to_string())),
        None => (None, None),
    };

    Some(IndexEntry {
        label: page.label.clone(),
        href,
        description_html: renderer.markdown(&description),
        repo_url,
        release_label: page.latest_release.clone(),
        release_url,
        package_url,
        package_label,
    })
}

/// The generator's sidecar names the entry file; trust it only if the file
/// is actually there.
fn sidecar_first_file(output_dir: &Path, key: &str) -> Option<String> {
    let raw = fs::read_to_string(output_dir.join(meta_filename(key))).ok()?;
    let meta: PageMeta = serde_json::from_str(&raw).ok()?;
    output_dir
        .join(&meta.first_file)
        .exists()
        .then_some(meta.first_file)
}

/// Scan the output directory for section files matching the page's prefix.
fn discover_first_file(output_dir: &Path, prefix: &str) -> Option<String> {
    let mut candidates: Vec<String> = fs::read_dir(output_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(prefix) && name.ends_with(".html"))
        .collect();
    candidates.sort_by_key(|name| (section_rank(name, prefix), name.clone()));
    candidates.into_iter().next()
}

fn section_rank(name: &str, prefix: &str) -> u8 {
    let stem = name
        .strip_prefix(prefix)
        .unwrap_or(name)
        .strip_suffix(".html")
        .unwrap_or(name);
    match stem {
        "introduction" => 0,
        "getting-started" => 1,
        _ => 2,
    }
}

/// Registry link for a released page, keyed by implementation language.
fn package_link(page: &PageConfig) -> Option<(String, &'static str)> {
    page.latest_release.as_ref()?;
    let language = page.language.as_deref()?;
    let name = package_name(page);
    match language {
        "rust" => Some((format!("https://crates.io/crates/{name}"), "crates.io")),
        "python" => Some((format!("https://pypi.org/project/{name}/"), "PyPI")),
        "typescript" | "javascript" => {
            Some((format!("https://www.npmjs.com/package/{name}"), "npm"))
        }
        _ => None,
    }
}

/// Package name: the repository tail, or the page key for repo-less pages.
fn package_name(page: &PageConfig) -> &str {
    match &page.repo {
        Some(repo) => repo.split_once('/').map_or(repo.as_str(), |(_, tail)| tail),
        None => &page.key,
    }
}

// ============================================================================
// Tests
// ============================================================================
