//! Rewriting of relative markdown links to immutable GitHub URLs.
//!
//! Intra-repository links (`./foo.md`, `../images/diagram.png`) break once
//! the rendered HTML leaves the repository checkout. The rewriter turns
//! them into absolute `https://github.com/<repo>/blob/<ref>/...` URLs,
//! pinned to the page's release tag when one is configured so links keep
//! pointing at the documented version.
//!
//! Everything else is left alone: absolute URLs, `mailto:`/`tel:`/`data:`/
//! `javascript:` schemes, fragment-only `#...` anchors, protocol-relative
//! `//...` targets, rooted `/...` paths, and links that normalize to
//! nothing once `..` escapes past the repository root.

use crate::config::PageConfig;
use crate::render::LinkRewrite;
use regex::Regex;
use std::sync::OnceLock;

const SKIP_PREFIXES: [&str; 6] = [
    "http://",
    "https://",
    "mailto:",
    "tel:",
    "data:",
    "javascript:",
];

fn scheme_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("scheme pattern compiles"))
}

/// Rewrites relative link targets against a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubLinkRewriter {
    repo: String,
    git_ref: String,
    base_dir: String,
}

impl GitHubLinkRewriter {
    /// Build a rewriter for a page, or `None` when the page has no
    /// repository to rewrite against. The ref is the pinned release tag
    /// when present, the branch otherwise; relative paths resolve against
    /// the directory containing the source document.
    pub fn from_page(page: &PageConfig) -> Option<Self> {
        let repo = page.repo.as_deref()?;
        let git_ref = page
            .latest_release
            .clone()
            .unwrap_or_else(|| page.branch.clone());
        Some(GitHubLinkRewriter {
            repo: repo.to_string(),
            git_ref,
            base_dir: dirname(&page.doc_path).to_string(),
        })
    }
}

impl LinkRewrite for GitHubLinkRewriter {
    fn rewrite(&self, target: &str) -> Option<String> {
        if target.is_empty() {
            return None;
        }
        let lower = target.to_lowercase();
        if SKIP_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
            return None;
        }
        if target.starts_with('#') || target.starts_with("//") || target.contains("://") {
            return None;
        }

        let (path, query, fragment) = split_target(target);
        if scheme_pattern().is_match(path) {
            return None;
        }
        if path.is_empty() && !fragment.is_empty() {
            return None;
        }
        if path.starts_with('/') {
            return None;
        }

        let joined = if self.base_dir.is_empty() {
            normalize_posix(path)
        } else {
            normalize_posix(&format!("{}/{}", self.base_dir, path))
        };
        let mut joined = joined.as_str();
        while let Some(rest) = joined.strip_prefix("../") {
            joined = rest;
        }
        if joined.is_empty() || joined == "." {
            return None;
        }

        let mut url = format!(
            "https://github.com/{}/blob/{}/{}",
            self.repo, self.git_ref, joined
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        if !fragment.is_empty() {
            url.push('#');
            url.push_str(fragment);
        }
        Some(url)
    }
}

/// Split a link target into path, query, and fragment pieces.
fn split_target(target: &str) -> (&str, &str, &str) {
    let (without_fragment, fragment) = match target.split_once('#') {
        Some((head, frag)) => (head, frag),
        None => (target, ""),
    };
    let (path, query) = match without_fragment.split_once('?') {
        Some((head, q)) => (head, q),
        None => (without_fragment, ""),
    };
    (path, query, fragment)
}

/// Directory portion of a slash-separated path; empty for bare filenames.
fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Collapse `.` and `..` segments lexically, POSIX style. Leading `..`
/// segments that cannot be collapsed are preserved.
fn normalize_posix(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&"..") | None => parts.push(".."),
                Some(_) => {
                    parts.pop();
                }
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;

    fn rewriter() -> GitHubLinkRewriter {
        GitHubLinkRewriter {
            repo: "df12/testdocs".to_string(),
            git_ref: "main".to_string(),
            base_dir: "docs".to_string(),
        }
    }

    // ===== rewriting =====

    #[test]
    fn parent_dir_link_resolves_against_doc_dir() {
        let url = rewriter().rewrite("../cli.md#flags");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/cli.md#flags")
        );
    }

    #[test]
    fn sibling_link_keeps_doc_dir() {
        let url = rewriter().rewrite("guide.md");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/docs/guide.md")
        );
    }

    #[test]
    fn current_dir_prefix_collapsed() {
        let url = rewriter().rewrite("./guide.md");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/docs/guide.md")
        );
    }

    #[test]
    fn query_and_fragment_preserved() {
        let url = rewriter().rewrite("guide.md?plain=1#usage");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/docs/guide.md?plain=1#usage")
        );
    }

    #[test]
    fn escape_past_root_collapses_to_root() {
        let url = rewriter().rewrite("../../assets/logo.png");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/assets/logo.png")
        );
    }

    #[test]
    fn release_tag_wins_over_branch() {
        let mut rw = rewriter();
        rw.git_ref = "v9.9.9".to_string();
        let url = rw.rewrite("guide.md");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/v9.9.9/docs/guide.md")
        );
    }

    #[test]
    fn doc_at_repo_root_has_empty_base() {
        let mut rw = rewriter();
        rw.base_dir = String::new();
        let url = rw.rewrite("cli.md");
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/cli.md")
        );
    }

    // ===== skipped targets =====

    #[test]
    fn absolute_and_scheme_targets_skipped() {
        let rw = rewriter();
        for target in [
            "http://example.com/x",
            "https://example.com/x",
            "HTTPS://EXAMPLE.COM/x",
            "mailto:docs@example.com",
            "tel:+15551234567",
            "data:text/plain;base64,aGk=",
            "javascript:alert(1)",
            "ftp://example.com/file",
            "weird:thing",
        ] {
            assert_eq!(rw.rewrite(target), None, "{target} should be skipped");
        }
    }

    #[test]
    fn fragment_only_skipped() {
        assert_eq!(rewriter().rewrite("#install"), None);
    }

    #[test]
    fn protocol_relative_skipped() {
        assert_eq!(rewriter().rewrite("//cdn.example.com/lib.js"), None);
    }

    #[test]
    fn rooted_path_skipped() {
        assert_eq!(rewriter().rewrite("/etc/passwd"), None);
    }

    #[test]
    fn empty_target_skipped() {
        assert_eq!(rewriter().rewrite(""), None);
    }

    #[test]
    fn link_normalizing_to_doc_dir_itself_skipped() {
        // "docs/.." collapses to ".", which has nothing to point at.
        assert_eq!(rewriter().rewrite(".."), None);
        assert_eq!(rewriter().rewrite("../"), None);
    }

    // ===== construction =====

    #[test]
    fn built_from_page_config() {
        let page = PageConfig {
            repo: Some("df12/testdocs".to_string()),
            branch: "main".to_string(),
            doc_path: "docs/users-guide.md".to_string(),
            ..PageConfig::default()
        };
        let rw = GitHubLinkRewriter::from_page(&page).expect("repo is set");
        assert_eq!(
            rw.rewrite("../cli.md#flags").as_deref(),
            Some("https://github.com/df12/testdocs/blob/main/cli.md#flags")
        );
    }

    #[test]
    fn page_without_repo_builds_nothing() {
        let page = PageConfig::default();
        assert!(GitHubLinkRewriter::from_page(&page).is_none());
    }

    #[test]
    fn pinned_release_becomes_ref() {
        let page = PageConfig {
            repo: Some("df12/testdocs".to_string()),
            latest_release: Some("v2.0.0".to_string()),
            doc_path: "README.md".to_string(),
            ..PageConfig::default()
        };
        let rw = GitHubLinkRewriter::from_page(&page).expect("repo is set");
        assert_eq!(
            rw.rewrite("cli.md").as_deref(),
            Some("https://github.com/df12/testdocs/blob/v2.0.0/cli.md")
        );
    }

    // ===== path helpers =====

    #[test]
    fn dirname_splits_last_component() {
        assert_eq!(dirname("docs/users-guide.md"), "docs");
        assert_eq!(dirname("a/b/c.md"), "a/b");
        assert_eq!(dirname("README.md"), "");
    }

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(normalize_posix("docs/./guide.md"), "docs/guide.md");
        assert_eq!(normalize_posix("docs/../cli.md"), "cli.md");
        assert_eq!(normalize_posix("docs/sub/../../cli.md"), "cli.md");
        assert_eq!(normalize_posix("../x"), "../x");
        assert_eq!(normalize_posix("docs/"), "docs");
        assert_eq!(normalize_posix(""), ".");
    }
}
