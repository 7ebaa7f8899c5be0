use alloc::borrow::Cow;

use crate::delimiter::Delimiters;

/// Default cap on the raw length, in bytes, of a captured search excerpt.
pub const DEFAULT_MAX_SEARCH_LEN: usize = 32 * 1024;

/// Chat notice appended when a search excerpt cannot be applied.
pub const DEFAULT_SEARCH_MISS_NOTICE: &str = "\n\n*(I couldn't find the exact text to replace. I might have hallucinated the location.)*";

/// Configuration for the [`Tokenizer`](crate::Tokenizer).
///
/// # Examples
///
/// ```rust
/// use docflow::{Tokenizer, TokenizerOptions};
///
/// let tokenizer = Tokenizer::new(TokenizerOptions {
///     max_search_len: Some(4096),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// The delimiter grammar to recognize.
    ///
    /// # Default
    ///
    /// [`Delimiters::default`]
    pub delimiters: Delimiters,

    /// Upper bound on how many bytes the tokenizer retains while waiting for
    /// the end of a search excerpt.
    ///
    /// An excerpt whose raw length exceeds the bound is abandoned: the
    /// tokenizer emits [`StreamEvent::SearchOverflow`] in place of
    /// [`StreamEvent::ReplaceBegin`] and stops buffering the excerpt. `None`
    /// buffers without limit.
    ///
    /// [`StreamEvent::SearchOverflow`]: crate::StreamEvent::SearchOverflow
    /// [`StreamEvent::ReplaceBegin`]: crate::StreamEvent::ReplaceBegin
    ///
    /// # Default
    ///
    /// `Some(DEFAULT_MAX_SEARCH_LEN)`
    pub max_search_len: Option<usize>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            max_search_len: Some(DEFAULT_MAX_SEARCH_LEN),
        }
    }
}

/// Configuration for the [`PatchEngine`](crate::PatchEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Text appended to the transcript when a targeted replace cannot find
    /// its excerpt.
    ///
    /// # Default
    ///
    /// [`DEFAULT_SEARCH_MISS_NOTICE`]
    pub search_miss_notice: Cow<'static, str>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            search_miss_notice: Cow::Borrowed(DEFAULT_SEARCH_MISS_NOTICE),
        }
    }
}
