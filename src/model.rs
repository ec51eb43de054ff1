//! Section model builder.
//!
//! Combines a parsed [`Section`](crate::sections::Section) with its
//! configured [`SectionLayout`](crate::config::SectionLayout) and produces
//! the render-ready [`SectionModel`]: pre-rendered HTML fragments, a table
//! of contents, and any device-specific structures (step lists, split
//! panels). Templates consume the model without touching markdown.
//!
//! Devices degrade rather than fail: a `numbered_steps` section with no
//! subsections and a `split_panel` section with no fenced code both fall
//! back to the default single-column device.

use crate::config::{Device, SectionLayout};
use crate::render::HtmlRenderer;
use crate::sections::{Section, slugify, unique_slug};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Fenced code block with an optional language annotation. The rest of the
/// info string after the language is ignored.
fn code_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```([A-Za-z0-9_+#.-]+)?[^\n]*\n(.*?)```")
            .expect("code block pattern compiles")
    })
}

/// Render-ready view of one section.
#[derive(Debug, Clone)]
pub struct SectionModel {
    pub slug: String,
    pub title: String,
    pub short_title: String,
    /// 1-based position in the document.
    pub order: usize,
    /// Effective device after fallbacks, not necessarily the configured one.
    pub device: Device,
    /// Rendered intro (body above the first subsection).
    pub intro_html: String,
    /// Rendered full body, used by the default device.
    pub body_html: String,
    pub subsections: Vec<SubsectionBlock>,
    pub toc: Vec<TocItem>,
    /// Populated only for `numbered_steps`.
    pub steps: Vec<NumberedStep>,
    /// Populated only for `split_panel`.
    pub split: Option<SplitPanel>,
}

#[derive(Debug, Clone)]
pub struct SubsectionBlock {
    pub anchor: String,
    pub title: String,
    pub body_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    pub label: String,
    pub anchor: String,
}

#[derive(Debug, Clone)]
pub struct NumberedStep {
    /// 1-based position in the resolved order.
    pub number: usize,
    pub title: String,
    pub anchor: String,
    pub body_html: String,
}

#[derive(Debug, Clone)]
pub struct SplitPanel {
    /// Prose with the featured code block removed.
    pub primary_html: String,
    /// The featured block, highlighted.
    pub code_html: String,
    pub language: String,
}

/// Build the render model for one section under the given layout.
pub fn build_section_model(
    section: &Section,
    layout: &SectionLayout,
    renderer: &HtmlRenderer,
) -> SectionModel {
    let mut model = SectionModel {
        slug: section.slug.clone(),
        title: section.title.clone(),
        short_title: section.short_title.clone(),
        order: section.order,
        device: layout.device,
        intro_html: renderer.markdown(&section.intro_markdown),
        body_html: renderer.markdown(&section.markdown),
        subsections: subsection_blocks(section, renderer),
        toc: Vec::new(),
        steps: Vec::new(),
        split: None,
    };
    model.toc = model
        .subsections
        .iter()
        .map(|block| TocItem {
            label: block.title.clone(),
            anchor: block.anchor.clone(),
        })
        .collect();

    match layout.device {
        Device::Default => {}
        Device::NumberedSteps => {
            if section.subsections.is_empty() {
                model.device = Device::Default;
            } else {
                model.steps = prepare_numbered_steps(section, layout, renderer);
                model.toc = model
                    .steps
                    .iter()
                    .map(|step| TocItem {
                        label: step.title.clone(),
                        anchor: step.anchor.clone(),
                    })
                    .collect();
            }
        }
        Device::SplitPanel => match prepare_split_panel(section, layout, renderer) {
            Some(split) => model.split = Some(split),
            None => model.device = Device::Default,
        },
    }
    model
}

fn subsection_blocks(section: &Section, renderer: &HtmlRenderer) -> Vec<SubsectionBlock> {
    let mut used = HashSet::new();
    section
        .subsections
        .iter()
        .enumerate()
        .map(|(index, sub)| {
            let base = slugify(&sub.title);
            let candidate = if base == "section" {
                // Title had no usable characters.
                format!("{}-part-{}", section.slug, index + 1)
            } else {
                format!("{}-{}", section.slug, base)
            };
            SubsectionBlock {
                anchor: unique_slug(&candidate, &mut used),
                title: sub.title.clone(),
                body_html: renderer.markdown(&sub.markdown),
            }
        })
        .collect()
}

/// Order subsections as steps: titles named in `step_order` first (matched
/// case-insensitively, first occurrence wins), the rest in document order.
fn prepare_numbered_steps(
    section: &Section,
    layout: &SectionLayout,
    renderer: &HtmlRenderer,
) -> Vec<NumberedStep> {
    let mut by_title: HashMap<String, usize> = HashMap::new();
    for (index, sub) in section.subsections.iter().enumerate() {
        by_title
            .entry(sub.title.trim().to_lowercase())
            .or_insert(index);
    }

    let mut picked: Vec<usize> = Vec::new();
    for wanted in &layout.step_order {
        if let Some(&index) = by_title.get(&wanted.trim().to_lowercase()) {
            if !picked.contains(&index) {
                picked.push(index);
            }
        }
    }
    for index in 0..section.subsections.len() {
        if !picked.contains(&index) {
            picked.push(index);
        }
    }

    picked
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let sub = &section.subsections[index];
            NumberedStep {
                number: position + 1,
                title: sub.title.clone(),
                anchor: format!("{}-step-{}", section.slug, position + 1),
                body_html: renderer.markdown(&sub.markdown),
            }
        })
        .collect()
}

/// Extract the featured code block and render the remaining prose. Returns
/// `None` when the section has no fenced code at all.
fn prepare_split_panel(
    section: &Section,
    layout: &SectionLayout,
    renderer: &HtmlRenderer,
) -> Option<SplitPanel> {
    let matches: Vec<_> = code_block_pattern()
        .captures_iter(&section.markdown)
        .collect();
    if matches.is_empty() {
        return None;
    }

    let mut index = layout.emphasized_code_block.unwrap_or(0);
    if index >= matches.len() {
        index = 0;
    }
    let captures = &matches[index];
    let whole = captures.get(0).map_or(0..0, |m| m.range());
    let language = captures
        .get(1)
        .map_or("text", |m| m.as_str())
        .to_string();
    let code = captures
        .get(2)
        .map_or("", |m| m.as_str())
        .trim_matches('\n');

    let before = &section.markdown[..whole.start];
    let after = &section.markdown[whole.end..];
    let primary = format!("{before}\n\n{after}").trim().to_string();

    Some(SplitPanel {
        primary_html: renderer.markdown(&primary),
        code_html: renderer.code_block(code, Some(&language)),
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DEFAULT_THEME;
    use crate::sections::parse_sections;

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(DEFAULT_THEME)
    }

    fn section_from(markdown: &str) -> Section {
        let mut sections = parse_sections(markdown);
        assert!(!sections.is_empty(), "fixture must contain a section");
        sections.remove(0)
    }

    fn layout(device: Device) -> SectionLayout {
        SectionLayout {
            device,
            ..SectionLayout::default()
        }
    }

    // ===== default device =====

    #[test]
    fn default_device_renders_body_and_toc() {
        let section = section_from(
            "## Setup\n\nIntro text.\n\n### Install\n\nRun it.\n\n### Configure\n\nEdit it.\n",
        );
        let model = build_section_model(&section, &SectionLayout::default(), &renderer());
        assert_eq!(model.device, Device::Default);
        assert_eq!(model.order, 1);
        assert!(model.body_html.contains("Intro text."));
        assert!(model.intro_html.contains("Intro text."));
        assert!(!model.intro_html.contains("Run it."));
        assert_eq!(model.steps.len(), 0);
        assert!(model.split.is_none());
        let labels: Vec<&str> = model.toc.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Install", "Configure"]);
    }

    #[test]
    fn subsection_anchors_derive_from_titles() {
        let section = section_from("## Setup\n\n### Install\n\nA.\n\n### Dry Run\n\nB.\n");
        let model = build_section_model(&section, &SectionLayout::default(), &renderer());
        let anchors: Vec<&str> = model.subsections.iter().map(|b| b.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["setup-install", "setup-dry-run"]);
    }

    #[test]
    fn unsluggable_subsection_titles_get_positional_anchors() {
        let section = section_from("## Setup\n\n### !!!\n\nA.\n\n### ???\n\nB.\n");
        let model = build_section_model(&section, &SectionLayout::default(), &renderer());
        let anchors: Vec<&str> = model.subsections.iter().map(|b| b.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["setup-part-1", "setup-part-2"]);
    }

    #[test]
    fn duplicate_subsection_anchors_get_suffix() {
        let section = section_from("## Setup\n\n### Install\n\nA.\n\n### Install\n\nB.\n");
        let model = build_section_model(&section, &SectionLayout::default(), &renderer());
        let anchors: Vec<&str> = model.subsections.iter().map(|b| b.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["setup-install", "setup-install-2"]);
    }

    #[test]
    fn intro_html_empty_when_body_opens_with_subsection() {
        let section = section_from("## Setup\n\n### Install\n\nA.\n");
        let model = build_section_model(&section, &SectionLayout::default(), &renderer());
        assert_eq!(model.intro_html, "");
    }

    // ===== numbered steps =====

    #[test]
    fn step_order_reorders_matches_then_appends_rest() {
        let section = section_from(
            "## Setup\n\n### Configure\n\nC.\n\n### Install\n\nI.\n\n### Verify\n\nV.\n",
        );
        let layout = SectionLayout {
            device: Device::NumberedSteps,
            step_order: vec!["install".to_string(), "CONFIGURE".to_string()],
            emphasized_code_block: None,
        };
        let model = build_section_model(&section, &layout, &renderer());
        assert_eq!(model.device, Device::NumberedSteps);
        let titles: Vec<&str> = model.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Install", "Configure", "Verify"]);
        let anchors: Vec<&str> = model.steps.iter().map(|s| s.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["setup-step-1", "setup-step-2", "setup-step-3"]);
        assert_eq!(model.steps[0].number, 1);
        assert_eq!(model.steps[2].number, 3);
    }

    #[test]
    fn step_order_entries_without_match_are_ignored() {
        let section = section_from("## Setup\n\n### Install\n\nI.\n");
        let layout = SectionLayout {
            device: Device::NumberedSteps,
            step_order: vec!["Missing".to_string(), "Install".to_string()],
            emphasized_code_block: None,
        };
        let model = build_section_model(&section, &layout, &renderer());
        assert_eq!(model.steps.len(), 1);
        assert_eq!(model.steps[0].title, "Install");
    }

    #[test]
    fn repeated_step_order_entries_do_not_duplicate() {
        let section = section_from("## Setup\n\n### Install\n\nI.\n\n### Verify\n\nV.\n");
        let layout = SectionLayout {
            device: Device::NumberedSteps,
            step_order: vec!["Install".to_string(), "install".to_string()],
            emphasized_code_block: None,
        };
        let model = build_section_model(&section, &layout, &renderer());
        let titles: Vec<&str> = model.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Install", "Verify"]);
    }

    #[test]
    fn steps_replace_the_toc() {
        let section = section_from("## Setup\n\n### B\n\nb.\n\n### A\n\na.\n");
        let layout = SectionLayout {
            device: Device::NumberedSteps,
            step_order: vec!["A".to_string()],
            emphasized_code_block: None,
        };
        let model = build_section_model(&section, &layout, &renderer());
        let toc: Vec<(&str, &str)> = model
            .toc
            .iter()
            .map(|t| (t.label.as_str(), t.anchor.as_str()))
            .collect();
        assert_eq!(toc, vec![("A", "setup-step-1"), ("B", "setup-step-2")]);
    }

    #[test]
    fn numbered_steps_without_subsections_falls_back() {
        let section = section_from("## Setup\n\nJust prose, no headings.\n");
        let model = build_section_model(&section, &layout(Device::NumberedSteps), &renderer());
        assert_eq!(model.device, Device::Default);
        assert!(model.steps.is_empty());
    }

    // ===== split panel =====

    #[test]
    fn split_panel_extracts_first_block_by_default() {
        let section = section_from(
            "## Usage\n\nBefore.\n\n```sh\nnetsuke build\n```\n\nAfter.\n\n```rust\nfn x() {}\n```\n",
        );
        let model = build_section_model(&section, &layout(Device::SplitPanel), &renderer());
        assert_eq!(model.device, Device::SplitPanel);
        let split = model.split.expect("split populated");
        assert_eq!(split.language, "sh");
        assert!(split.code_html.contains("netsuke"));
        assert!(split.primary_html.contains("Before."));
        assert!(split.primary_html.contains("After."));
        // The featured block left the prose panel; the other one stayed.
        assert!(!split.primary_html.contains("data-language=\"sh\""));
        assert!(split.primary_html.contains("data-language=\"rust\""));
    }

    #[test]
    fn split_panel_honors_emphasized_index() {
        let section = section_from(
            "## Usage\n\n```sh\nfirst\n```\n\n```rust\nsecond\n```\n",
        );
        let layout = SectionLayout {
            device: Device::SplitPanel,
            step_order: Vec::new(),
            emphasized_code_block: Some(1),
        };
        let model = build_section_model(&section, &layout, &renderer());
        let split = model.split.expect("split populated");
        assert_eq!(split.language, "rust");
        assert!(split.code_html.contains("second"));
    }

    #[test]
    fn split_panel_out_of_range_index_uses_first_block() {
        let section = section_from(
            "## Usage\n\n```sh\nfirst\n```\n\n```rust\nsecond\n```\n",
        );
        let layout = SectionLayout {
            device: Device::SplitPanel,
            step_order: Vec::new(),
            emphasized_code_block: Some(5),
        };
        let model = build_section_model(&section, &layout, &renderer());
        assert_eq!(model.split.expect("split populated").language, "sh");
    }

    #[test]
    fn split_panel_without_fences_falls_back() {
        let section = section_from("## Usage\n\nNothing but prose.\n");
        let model = build_section_model(&section, &layout(Device::SplitPanel), &renderer());
        assert_eq!(model.device, Device::Default);
        assert!(model.split.is_none());
    }

    #[test]
    fn split_panel_unannotated_fence_defaults_to_text() {
        let section = section_from("## Usage\n\n```\nplain\n```\n");
        let model = build_section_model(&section, &layout(Device::SplitPanel), &renderer());
        let split = model.split.expect("split populated");
        assert_eq!(split.language, "text");
        assert!(split.code_html.contains("data-language=\"text\""));
    }

    #[test]
    fn split_panel_ignores_fence_annotations_after_language() {
        let section = section_from("## Usage\n\n```yaml title=pages.yaml\nkey: value\n```\n");
        let model = build_section_model(&section, &layout(Device::SplitPanel), &renderer());
        assert_eq!(model.split.expect("split populated").language, "yaml");
    }

    #[test]
    fn split_panel_keeps_toc_from_subsections() {
        let section = section_from(
            "## Usage\n\n```sh\nrun\n```\n\n### Flags\n\nDetails.\n",
        );
        let model = build_section_model(&section, &layout(Device::SplitPanel), &renderer());
        assert_eq!(model.toc.len(), 1);
        assert_eq!(model.toc[0].anchor, "usage-flags");
    }
}
