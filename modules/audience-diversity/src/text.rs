//! Text assembly and filtering for the topic fallback.

use crate::types::{Platform, Post};
use crate::urls::remove_urls;

/// Texts with this many whitespace-separated tokens or fewer (after URL
/// removal) are too short to classify.
pub const MAX_TRIVIAL_TOKENS: usize = 3;

/// Text of a post as the topic model should see it. Reddit joins the title and
/// body; other platforms use the body alone.
pub fn post_text(post: &Post, platform: Platform) -> Option<String> {
    match platform {
        Platform::Reddit => match (&post.title, &post.text) {
            (Some(title), Some(text)) => Some(format!("{title}. {text}")),
            (Some(title), None) => Some(title.clone()),
            (None, Some(text)) => Some(text.clone()),
            (None, None) => None,
        },
        Platform::Twitter | Platform::Other => post.text.clone(),
    }
}

/// Strip URLs and reject trivially short text.
pub fn usable_text(raw: &str) -> Option<String> {
    let stripped = remove_urls(raw);
    let stripped = stripped.trim();
    if stripped.split_whitespace().count() <= MAX_TRIVIAL_TOKENS {
        return None;
    }
    Some(stripped.to_string())
}
