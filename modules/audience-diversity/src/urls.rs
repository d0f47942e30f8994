//! Candidate URL extraction, platform filtering and registrable-domain
//! normalization.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Platform, Post};

/// Substrings marking social or reference platforms. A link to one of these
/// says nothing about which news source a post points at.
pub const PLATFORM_BLOCKLIST: &[&str] = &[
    "twitter.com",
    "youtube.com",
    "youtu.be",
    "pubmed.ncbi.nlm.nih.gov",
    "ncbi.nlm.nih.gov",
    "tumblr.com",
    "wikipedia.org",
    "reddit.com",
    "facebook.com",
    "medium.com",
    "pbs.twimg",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s]+").unwrap());
static URL_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());

#[derive(Debug, Clone)]
pub struct PlatformBlocklist {
    patterns: Vec<String>,
}

impl Default for PlatformBlocklist {
    fn default() -> Self {
        Self::new(PLATFORM_BLOCKLIST.iter().copied())
    }
}

impl PlatformBlocklist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// True when `url` (or domain) contains any blocked substring.
    pub fn blocks(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

/// First `http(s)://` token in free text.
pub fn first_url(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// Remove every URL (and bare `www.` link) from text.
pub fn remove_urls(text: &str) -> Cow<'_, str> {
    URL_STRIP_RE.replace_all(text, "")
}

/// The one URL scoring considers for a post, if any.
///
/// Twitter posts use the first non-platform entry of `embedded_urls`, then
/// `expanded_url`. Everything else uses the first URL in the text; when that
/// URL is a platform link the post has no candidate (later URLs are not
/// considered).
pub fn candidate_url(post: &Post, platform: Platform, blocklist: &PlatformBlocklist) -> Option<String> {
    match platform {
        Platform::Twitter => post
            .embedded_urls
            .iter()
            .find(|url| !blocklist.blocks(url))
            .or_else(|| {
                post.expanded_url
                    .as_ref()
                    .filter(|url| !url.is_empty() && !blocklist.blocks(url))
            })
            .cloned(),
        Platform::Reddit | Platform::Other => {
            let url = first_url(post.text.as_deref()?)?;
            (!blocklist.blocks(url)).then(|| url.to_string())
        }
    }
}

/// Registrable domain of a resolved URL: the host's last two labels,
/// lowercased (`https://www.nytimes.com/a` -> `nytimes.com`).
///
/// Returns `None` for URLs with fewer than three `/`-separated components.
/// Multi-label public suffixes are not understood, so `news.bbc.co.uk`
/// becomes `co.uk`; the domain table is keyed the same way.
pub fn registrable_domain(url: &str) -> Option<String> {
    let host = url.split('/').nth(2)?;
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    Some(labels[start..].join(".").to_lowercase())
}
