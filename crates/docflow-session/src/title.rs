//! Document titles.
//!
//! Titles are produced by a separate, non-streaming model call. Any failure
//! along the way falls back to [`UNTITLED`].

use std::future::Future;

use thiserror::Error;
use tracing::{debug, warn};

/// Title used when no better one is available.
pub const UNTITLED: &str = "Untitled Document";

/// How much of the document, in characters, the title prompt includes.
pub const TITLE_CONTEXT_CHARS: usize = 500;

/// Failure reported by a [`TitleSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("title generation failed: {0}")]
pub struct TitleError(pub String);

/// Produces a raw title from a prompt.
pub trait TitleSource {
    /// Answer `prompt` with a short title. The answer is cleaned up by
    /// [`clean_title`] before use.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, TitleError>> + Send;
}

/// A [`TitleSource`] that always answers with the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTitle(String);

impl FixedTitle {
    /// Answer every prompt with `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }
}

impl TitleSource for FixedTitle {
    fn generate(&self, _prompt: &str) -> impl Future<Output = Result<String, TitleError>> + Send {
        std::future::ready(Ok(self.0.clone()))
    }
}

/// The prompt asking for a title for `document`.
#[must_use]
pub fn title_prompt(document: &str) -> String {
    let head = match document.char_indices().nth(TITLE_CONTEXT_CHARS) {
        Some((at, _)) => &document[..at],
        None => document,
    };
    format!("Generate a very short, specific title (max 5 words) for this document:\n\n{head}...")
}

/// Trim a raw answer and strip one surrounding quote on each side.
///
/// ```
/// use docflow_session::title::{UNTITLED, clean_title};
///
/// assert_eq!(clean_title("  \"Launch Plan\"\n"), "Launch Plan");
/// assert_eq!(clean_title("''"), UNTITLED);
/// ```
#[must_use]
pub fn clean_title(raw: &str) -> String {
    const QUOTES: [char; 2] = ['"', '\''];
    let title = raw.trim();
    let title = title.strip_prefix(QUOTES).unwrap_or(title);
    let title = title.strip_suffix(QUOTES).unwrap_or(title);
    if title.is_empty() {
        UNTITLED.to_owned()
    } else {
        title.to_owned()
    }
}

/// Ask `source` for a title for `document`, falling back to [`UNTITLED`].
pub async fn regenerate_title<T: TitleSource>(source: &T, document: &str) -> String {
    if document.trim().is_empty() {
        return UNTITLED.to_owned();
    }
    match source.generate(&title_prompt(document)).await {
        Ok(raw) => {
            let title = clean_title(&raw);
            debug!(%title, "title regenerated");
            title
        }
        Err(err) => {
            warn!(%err, "keeping the default title");
            UNTITLED.to_owned()
        }
    }
}
