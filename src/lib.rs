//! # Pagesmith
//!
//! A static documentation site generator. Each configured page tracks one
//! upstream markdown document, typically a users guide kept in a GitHub
//! repository. Pagesmith fetches the document, splits it into sections,
//! and renders a themed multi-page HTML site, plus an index page listing
//! every configured page.
//!
//! # Architecture: One Pipeline Per Page
//!
//! Generating a page runs a linear pipeline of plain functions over plain
//! data:
//!
//! ```text
//! 1. Fetch    source_url         →  markdown          (HTTP, with retries)
//! 2. Parse    markdown           →  Vec<Section>      ('##' boundaries, slugs)
//! 3. Model    Section + layout   →  SectionModel      (HTML fragments, toc, devices)
//! 4. Render   SectionModel       →  docs-<slug>.html  (maud templates)
//! ```
//!
//! Only the first and last steps touch the outside world, so everything in
//! between is unit-testable from string fixtures.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | YAML site configuration: pages, defaults, themes, section layouts |
//! | [`fetch`] | HTTP download of source documents, with retry and freshness metadata |
//! | [`sections`] | Markdown section parser: '##' splitting, slugs, bold-heading promotion |
//! | [`render`] | Markdown to HTML with syntect highlighting and link rewriting |
//! | [`links`] | Rewrites relative links to GitHub blob URLs at the right ref |
//! | [`model`] | Render-ready section models: toc, numbered steps, split panels |
//! | [`templates`] | Maud templates for section pages and the docs index |
//! | [`generate`] | Per-page orchestration: fetch, parse, model, render, write |
//! | [`index`] | Docs index generation: entry discovery and outbound links |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sections Become Pages
//!
//! A users guide is one long markdown file because that is the easiest
//! thing to maintain next to the code. It reads badly as one long HTML
//! page. Splitting on level-2 headings gives each topic its own URL, its
//! own sidebar entry, and its own table of contents, without asking
//! upstream authors to restructure anything.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than a runtime template engine. Malformed
//! HTML is a build error, template variables are typed Rust expressions,
//! interpolation is auto-escaped, and there is no template directory to
//! ship or get out of sync. The one CSS file is embedded at compile time
//! for the same reason.
//!
//! ## Class-Based Highlighting
//!
//! Code blocks are highlighted with syntect into class-annotated spans
//! plus one generated stylesheet per theme, instead of inline styles on
//! every token. Pages stay small, and re-theming a site means swapping a
//! stylesheet rather than regenerating every page's markup.
//!
//! ## Release Pinning
//!
//! When a page knows its latest release, the source document is fetched at
//! the release tag and relative links are rewritten to blob URLs at that
//! same tag. Published docs therefore describe the code people actually
//! install, not whatever landed on the default branch this morning.

pub mod config;
pub mod fetch;
pub mod generate;
pub mod index;
pub mod links;
pub mod model;
pub mod output;
pub mod render;
pub mod sections;
pub mod templates;
