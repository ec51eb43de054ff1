//! Site configuration module.
//!
//! Handles loading and validating the YAML site description (`pages.yaml`).
//! A site is a set of documentation pages, each backed by one upstream
//! markdown document, plus site-wide defaults that individual pages may
//! override.
//!
//! ## Config File Shape
//!
//! ```yaml
//! defaults:
//!   output_dir: public
//!   filename_prefix: docs-
//!   branch: main
//!   doc_path: docs/users-guide.md
//!   docs_index_output: public/docs.html
//!   theme:
//!     site_name: df12 Productions
//!     doc_label: Docs
//!
//! # Layouts shared by every page, keyed by section slug.
//! layouts:
//!   getting-started:
//!     device: numbered_steps
//!     step_order: [Install, Configure]
//!
//! pages:
//!   netsuke:
//!     repo: df12/netsuke
//!     language: rust
//!     latest_release: v1.2.3
//!     latest_release_published_at: 2025-10-09T12:00:00Z
//!     description: A build tool with manifest-driven rules.
//!     layouts:
//!       usage:
//!         device: split_panel
//!         emphasized_code_block: 1
//! ```
//!
//! Every field under `defaults` and under a page entry is optional; a page
//! needs only enough to locate its source document (`source_url`, or `repo`
//! from which a raw GitHub URL is derived). Unknown keys are rejected to
//! catch typos early.

use crate::render::DEFAULT_THEME;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("unknown page '{0}'")]
    UnknownPage(String),
}

/// Fallback document path inside a repository.
pub const DEFAULT_DOC_PATH: &str = "docs/users-guide.md";

/// Presentation device for a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Single prose column rendered from the full section body.
    #[default]
    Default,
    /// Subsections presented as an ordered step list.
    NumberedSteps,
    /// Prose alongside one featured code block.
    SplitPanel,
}

/// Per-slug presentation policy. Absent slugs resolve to the default
/// device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionLayout {
    pub device: Device,
    /// Preferred subsection ordering for `numbered_steps`, matched by
    /// title (case-insensitive).
    pub step_order: Vec<String>,
    /// 0-based index of the code block featured by `split_panel`.
    pub emphasized_code_block: Option<usize>,
}

/// Look and copy of the rendered pages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub hero_eyebrow: String,
    pub hero_tagline: String,
    pub doc_label: String,
    pub site_name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            hero_eyebrow: "df12".to_string(),
            hero_tagline: "Documentation".to_string(),
            doc_label: "Docs".to_string(),
            site_name: "df12 Productions".to_string(),
        }
    }
}

/// Fully resolved configuration for one documentation page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub key: String,
    pub label: String,
    /// URL of the markdown source. Always set after loading: explicit, or
    /// derived from `repo`/`branch`/`doc_path`.
    pub source_url: String,
    pub source_label: String,
    pub page_title_suffix: String,
    pub filename_prefix: String,
    pub output_dir: PathBuf,
    /// Highlighting theme name; unknown names fall back at render time.
    pub highlight_style: String,
    pub footer_note: String,
    pub theme: ThemeConfig,
    pub layouts: BTreeMap<String, SectionLayout>,
    /// `owner/name` GitHub repository, when the page is repo-backed.
    pub repo: Option<String>,
    pub branch: String,
    /// Implementation language, lowercased; drives package-registry links
    /// on the docs index.
    pub language: Option<String>,
    pub description: Option<String>,
    /// Repository-relative path of the source document.
    pub doc_path: String,
    pub latest_release: Option<String>,
    pub latest_release_published_at: Option<DateTime<Utc>>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            label: String::new(),
            source_url: String::new(),
            source_label: "Source material".to_string(),
            page_title_suffix: "Docs".to_string(),
            filename_prefix: "docs-".to_string(),
            output_dir: PathBuf::from("public"),
            highlight_style: DEFAULT_THEME.to_string(),
            footer_note: String::new(),
            theme: ThemeConfig::default(),
            layouts: BTreeMap::new(),
            repo: None,
            branch: "main".to_string(),
            language: None,
            description: None,
            doc_path: DEFAULT_DOC_PATH.to_string(),
            latest_release: None,
            latest_release_published_at: None,
        }
    }
}

impl PageConfig {
    /// Presentation policy for a section slug; total, never fails.
    pub fn layout_for(&self, slug: &str) -> SectionLayout {
        self.layouts.get(slug).cloned().unwrap_or_default()
    }
}

/// The whole site: ordered pages plus site-wide settings.
#[derive(Debug, Clone, Default)]
pub struct SiteConfig {
    /// Pages in declaration order; order drives the docs index listing and
    /// the fallback page choice.
    pub pages: IndexMap<String, PageConfig>,
    pub default_page: Option<String>,
    pub docs_index_output: PathBuf,
    pub theme: ThemeConfig,
}

impl SiteConfig {
    /// Look up a page by key, falling back to the configured default page
    /// and then to the first declared page.
    pub fn get_page(&self, key: Option<&str>) -> Result<&PageConfig, ConfigError> {
        if let Some(key) = key {
            return self
                .pages
                .get(key)
                .ok_or_else(|| ConfigError::UnknownPage(key.to_string()));
        }
        if let Some(default) = &self.default_page {
            if let Some(page) = self.pages.get(default) {
                return Ok(page);
            }
        }
        self.pages
            .values()
            .next()
            .ok_or_else(|| ConfigError::Validation("no pages defined".to_string()))
    }
}

// =============================================================================
// Raw YAML shapes
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    defaults: RawDefaults,
    /// Layouts shared by every page.
    layouts: BTreeMap<String, SectionLayout>,
    pages: IndexMap<String, RawPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDefaults {
    theme: Option<RawTheme>,
    output_dir: Option<PathBuf>,
    filename_prefix: Option<String>,
    highlight_style: Option<String>,
    page_title_suffix: Option<String>,
    source_label: Option<String>,
    footer_note: Option<String>,
    default_page: Option<String>,
    branch: Option<String>,
    doc_path: Option<String>,
    repo: Option<String>,
    language: Option<String>,
    docs_index_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPage {
    label: Option<String>,
    source_url: Option<String>,
    source_label: Option<String>,
    page_title_suffix: Option<String>,
    filename_prefix: Option<String>,
    output_dir: Option<PathBuf>,
    highlight_style: Option<String>,
    footer_note: Option<String>,
    theme: Option<RawTheme>,
    layouts: BTreeMap<String, SectionLayout>,
    repo: Option<String>,
    branch: Option<String>,
    language: Option<String>,
    description: Option<String>,
    doc_path: Option<String>,
    latest_release: Option<String>,
    latest_release_published_at: Option<DateTime<Utc>>,
}

/// Sparse theme override; unset fields inherit from the base theme.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawTheme {
    hero_eyebrow: Option<String>,
    hero_tagline: Option<String>,
    doc_label: Option<String>,
    site_name: Option<String>,
}

fn merge_theme(base: &ThemeConfig, raw: Option<&RawTheme>) -> ThemeConfig {
    let Some(raw) = raw else {
        return base.clone();
    };
    ThemeConfig {
        hero_eyebrow: raw.hero_eyebrow.clone().unwrap_or_else(|| base.hero_eyebrow.clone()),
        hero_tagline: raw.hero_tagline.clone().unwrap_or_else(|| base.hero_tagline.clone()),
        doc_label: raw.doc_label.clone().unwrap_or_else(|| base.doc_label.clone()),
        site_name: raw.site_name.clone().unwrap_or_else(|| base.site_name.clone()),
    }
}

// =============================================================================
// Config loading and resolution
// =============================================================================

/// Load and resolve the site configuration from a YAML file.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    parse_site_config(&content)
}

/// Parse and resolve a site configuration from YAML text.
pub fn parse_site_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let raw: RawConfig = if content.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(content)?
    };
    resolve_site_config(raw)
}

fn resolve_site_config(raw: RawConfig) -> Result<SiteConfig, ConfigError> {
    if raw.pages.is_empty() {
        return Err(ConfigError::Validation(
            "no pages defined in site configuration".to_string(),
        ));
    }

    let defaults = raw.defaults;
    let site_theme = merge_theme(&ThemeConfig::default(), defaults.theme.as_ref());
    let stock = PageConfig::default();

    let mut pages = IndexMap::with_capacity(raw.pages.len());
    for (key, page) in raw.pages {
        let repo = page.repo.or_else(|| defaults.repo.clone());
        let branch = page
            .branch
            .or_else(|| defaults.branch.clone())
            .unwrap_or_else(|| stock.branch.clone());
        let doc_path = page
            .doc_path
            .or_else(|| defaults.doc_path.clone())
            .unwrap_or_else(|| stock.doc_path.clone());
        let source_url = match page.source_url {
            Some(url) => url,
            None => match &repo {
                Some(repo) => build_repo_url(repo, &branch, &doc_path),
                None => {
                    return Err(ConfigError::Validation(format!(
                        "page '{key}' is missing 'source_url' or 'repo'"
                    )));
                }
            },
        };

        let mut layouts = raw.layouts.clone();
        layouts.extend(page.layouts);

        let resolved = PageConfig {
            label: page
                .label
                .unwrap_or_else(|| title_case(&key.replace('-', " "))),
            source_url,
            source_label: page
                .source_label
                .or_else(|| defaults.source_label.clone())
                .unwrap_or_else(|| stock.source_label.clone()),
            page_title_suffix: page
                .page_title_suffix
                .or_else(|| defaults.page_title_suffix.clone())
                .unwrap_or_else(|| stock.page_title_suffix.clone()),
            filename_prefix: page
                .filename_prefix
                .or_else(|| defaults.filename_prefix.clone())
                .unwrap_or_else(|| stock.filename_prefix.clone()),
            output_dir: page
                .output_dir
                .or_else(|| defaults.output_dir.clone())
                .unwrap_or_else(|| stock.output_dir.clone()),
            highlight_style: page
                .highlight_style
                .or_else(|| defaults.highlight_style.clone())
                .unwrap_or_else(|| stock.highlight_style.clone()),
            footer_note: page
                .footer_note
                .or_else(|| defaults.footer_note.clone())
                .unwrap_or_default(),
            theme: merge_theme(&site_theme, page.theme.as_ref()),
            layouts,
            repo,
            branch,
            language: page
                .language
                .or_else(|| defaults.language.clone())
                .map(|l| l.to_lowercase()),
            description: page.description,
            doc_path,
            latest_release: page.latest_release,
            latest_release_published_at: page.latest_release_published_at,
            key: key.clone(),
        };
        pages.insert(key, resolved);
    }

    Ok(SiteConfig {
        pages,
        default_page: defaults.default_page,
        docs_index_output: defaults
            .docs_index_output
            .unwrap_or_else(|| PathBuf::from("public/docs.html")),
        theme: site_theme,
    })
}

/// Raw GitHub URL for a file at the given ref. Bare refs are treated as
/// branch names; refs already qualified with `refs/` are used verbatim.
pub fn build_repo_url(repo: &str, git_ref: &str, path: &str) -> String {
    let normalized = path.trim_start_matches('/');
    if git_ref.starts_with("refs/") {
        format!("https://raw.githubusercontent.com/{repo}/{git_ref}/{normalized}")
    } else {
        format!("https://raw.githubusercontent.com/{repo}/refs/heads/{git_ref}/{normalized}")
    }
}

/// Capitalize each space-separated word, lowercasing the rest.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
