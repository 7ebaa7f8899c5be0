//! The delimiter grammar shared with the model.
//!
//! Five literals split a response into prose and two instruction blocks. Only
//! the delimiters that are valid in the current [`ParserMode`] are ever
//! searched for; any other literal is inert text.

use alloc::borrow::Cow;

use crate::error::DelimiterError;

/// Interpretation context of the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ParserMode {
    /// Chat text, looking for a block opener.
    #[default]
    Prose,
    /// Inside a full-document write.
    FullWrite,
    /// Capturing the verbatim excerpt of a targeted replace.
    SearchCapture,
    /// Streaming the replacement body of a targeted replace.
    ReplaceWrite,
}

/// Which block a prose opener starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Opener {
    Document,
    Search,
}

/// The set of literal delimiters recognized by the tokenizer.
///
/// The default set is the one the system prompt teaches the model:
///
/// | delimiter | valid in | effect |
/// |---|---|---|
/// | `:::START_DOC:::` | prose | enter full write |
/// | `:::END_DOC:::` | full write | back to prose |
/// | `:::SEARCH:::` | prose | enter search capture |
/// | `:::REPLACE:::` | search capture | enter replace write |
/// | `:::END:::` | replace write | back to prose |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    start_doc: Cow<'static, str>,
    end_doc: Cow<'static, str>,
    search: Cow<'static, str>,
    replace: Cow<'static, str>,
    end_replace: Cow<'static, str>,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start_doc: Cow::Borrowed(":::START_DOC:::"),
            end_doc: Cow::Borrowed(":::END_DOC:::"),
            search: Cow::Borrowed(":::SEARCH:::"),
            replace: Cow::Borrowed(":::REPLACE:::"),
            end_replace: Cow::Borrowed(":::END:::"),
        }
    }
}

impl Delimiters {
    /// Build a custom delimiter set.
    ///
    /// # Errors
    ///
    /// Fails if any delimiter is empty, or if the two prose openers are the
    /// same literal.
    pub fn new(
        start_doc: impl Into<Cow<'static, str>>,
        end_doc: impl Into<Cow<'static, str>>,
        search: impl Into<Cow<'static, str>>,
        replace: impl Into<Cow<'static, str>>,
        end_replace: impl Into<Cow<'static, str>>,
    ) -> Result<Self, DelimiterError> {
        let set = Self {
            start_doc: start_doc.into(),
            end_doc: end_doc.into(),
            search: search.into(),
            replace: replace.into(),
            end_replace: end_replace.into(),
        };

        for (name, literal) in [
            ("document start", &set.start_doc),
            ("document end", &set.end_doc),
            ("search", &set.search),
            ("replace", &set.replace),
            ("replace end", &set.end_replace),
        ] {
            if literal.is_empty() {
                return Err(DelimiterError::Empty(name));
            }
        }
        if set.start_doc == set.search {
            return Err(DelimiterError::IdenticalOpeners(set.start_doc.into_owned()));
        }
        Ok(set)
    }

    /// Opens a full-document write.
    #[must_use]
    pub fn start_doc(&self) -> &str {
        &self.start_doc
    }

    /// Closes a full-document write.
    #[must_use]
    pub fn end_doc(&self) -> &str {
        &self.end_doc
    }

    /// Opens a targeted replace.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Separates the search excerpt from the replacement body.
    #[must_use]
    pub fn replace(&self) -> &str {
        &self.replace
    }

    /// Closes a targeted replace.
    #[must_use]
    pub fn end_replace(&self) -> &str {
        &self.end_replace
    }

    /// Locate the earliest prose opener in `haystack`.
    ///
    /// Ties at the same offset go to the document opener.
    pub(crate) fn find_opener(&self, haystack: &str) -> Option<(usize, Opener)> {
        let doc = haystack.find(self.start_doc());
        let search = haystack.find(self.search());
        match (doc, search) {
            (Some(d), Some(s)) if s < d => Some((s, Opener::Search)),
            (Some(d), _) => Some((d, Opener::Document)),
            (None, Some(s)) => Some((s, Opener::Search)),
            (None, None) => None,
        }
    }

    /// The delimiter that ends the block of `mode`, if any.
    pub(crate) fn closer(&self, mode: ParserMode) -> Option<&str> {
        match mode {
            ParserMode::Prose => None,
            ParserMode::FullWrite => Some(self.end_doc()),
            ParserMode::SearchCapture => Some(self.replace()),
            ParserMode::ReplaceWrite => Some(self.end_replace()),
        }
    }

    /// Length of the longest suffix of `buffer` that could still grow into
    /// one of the delimiters valid in `mode`.
    pub(crate) fn pending_suffix_len(&self, mode: ParserMode, buffer: &str) -> usize {
        match self.closer(mode) {
            Some(closer) => partial_suffix_len(buffer, &[closer]),
            None => partial_suffix_len(buffer, &[self.start_doc(), self.search()]),
        }
    }
}

/// Length of the longest suffix of `buffer` that is a proper prefix of one of
/// `candidates`. The suffix always starts on a char boundary.
pub(crate) fn partial_suffix_len(buffer: &str, candidates: &[&str]) -> usize {
    let longest = candidates.iter().map(|c| c.len()).max().unwrap_or(0);
    let limit = longest.saturating_sub(1).min(buffer.len());
    for len in (1..=limit).rev() {
        let start = buffer.len() - len;
        if !buffer.is_char_boundary(start) {
            continue;
        }
        let tail = &buffer[start..];
        if candidates.iter().any(|c| c.len() > len && c.starts_with(tail)) {
            return len;
        }
    }
    0
}
