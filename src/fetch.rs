//! Source document fetching.
//!
//! Downloads the upstream markdown document for a page over HTTP. Transient
//! server errors are retried with exponential backoff; anything else fails
//! immediately. The `Last-Modified` response header is captured so the
//! generator can stamp pages for sources that carry no release metadata.

use crate::config::PageConfig;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fetching {url}: {source}")]
    Transport { url: String, source: ureq::Error },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

const MAX_ATTEMPTS: u32 = 5;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Statuses worth retrying; everything else is treated as permanent.
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// A fetched markdown document plus the metadata the generator cares about.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub body: String,
    /// Verbatim `Last-Modified` header, when the server sent one.
    pub last_modified: Option<String>,
}

/// Pick the URL to fetch for a page.
///
/// An explicit override wins. Otherwise pages with a known release are
/// pinned to the release tag so published docs match the released code;
/// everything else uses the branch URL resolved at config load.
pub fn resolve_source_url(page: &PageConfig, override_url: Option<&str>) -> String {
    if let Some(url) = override_url {
        return url.to_string();
    }
    if let (Some(repo), Some(tag)) = (&page.repo, &page.latest_release) {
        return build_release_url(repo, tag, &page.doc_path);
    }
    page.source_url.clone()
}

fn build_release_url(repo: &str, tag: &str, path: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/{}/refs/tags/{}/{}",
        repo,
        tag,
        path.trim_start_matches('/')
    )
}

/// Fetch a markdown document, retrying transient server errors.
pub fn fetch_markdown(url: &str) -> Result<FetchedDocument, FetchError> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .into();

    let mut attempt = 0;
    loop {
        match agent.get(url).call() {
            Ok(response) => {
                let last_modified = response
                    .headers()
                    .get("last-modified")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let body = response
                    .into_body()
                    .read_to_string()
                    .map_err(|source| FetchError::Transport {
                        url: url.to_string(),
                        source,
                    })?;
                return Ok(FetchedDocument {
                    body,
                    last_modified,
                });
            }
            Err(ureq::Error::StatusCode(status)) if RETRY_STATUSES.contains(&status) => {
                attempt += 1;
                if attempt >= MAX_ATTEMPTS {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                thread::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1));
            }
            Err(ureq::Error::StatusCode(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(source) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        }
    }
}
