//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Netsuke (3 sections)
//!     Source: https://raw.githubusercontent.com/df12/netsuke/refs/tags/v1.2.3/docs/users-guide.md
//!     001 introduction → public/docs-introduction.html
//!     002 getting-started → public/docs-getting-started.html
//!     003 usage → public/docs-usage.html
//!     Metadata: public/.pagesmith-netsuke-meta.json
//! ```
//!
//! ## Index
//!
//! ```text
//! Docs index → public/docs.html (3 pages listed)
//! ```

use crate::config::PageConfig;
use crate::generate::PageArtifacts;
use crate::index::IndexArtifacts;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_position(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Format generate output: the page header, its source, and one line per
/// written section file.
pub fn format_generate_output(page: &PageConfig, artifacts: &PageArtifacts) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{} ({} sections)", page.label, artifacts.files.len()));
    lines.push(format!("    Source: {}", artifacts.source_url));

    for (i, file) in artifacts.files.iter().enumerate() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let stem = name
            .strip_prefix(page.filename_prefix.as_str())
            .unwrap_or(&name);
        let slug = stem.strip_suffix(".html").unwrap_or(stem);
        lines.push(format!(
            "    {} {} \u{2192} {}",
            format_position(i + 1),
            slug,
            file.display()
        ));
    }

    match &artifacts.meta_path {
        Some(path) => lines.push(format!("    Metadata: {}", path.display())),
        None => lines.push("    Metadata: not written".to_string()),
    }
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(page: &PageConfig, artifacts: &PageArtifacts) {
    for line in format_generate_output(page, artifacts) {
        println!("{}", line);
    }
}

/// Format index output as a single summary line.
pub fn format_index_output(artifacts: &IndexArtifacts) -> Vec<String> {
    vec![format!(
        "Docs index \u{2192} {} ({} pages listed)",
        artifacts.path.display(),
        artifacts.listed
    )]
}

/// Print index output to stdout.
pub fn print_index_output(artifacts: &IndexArtifacts) {
    for line in format_index_output(artifacts) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
