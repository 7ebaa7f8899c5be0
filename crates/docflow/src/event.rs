//! Events emitted by the tokenizer.
//!
//! # Examples
//!
//! ```
//! use docflow::{StreamEvent, tokenize, TokenizerOptions};
//!
//! let events = tokenize(
//!     ["hello :::START_DOC:::NEW CONTENT:::END_DOC::: bye"],
//!     TokenizerOptions::default(),
//! );
//! assert_eq!(
//!     events,
//!     vec![
//!         StreamEvent::text("hello "),
//!         StreamEvent::DocWriteBegin,
//!         StreamEvent::doc_chunk("NEW CONTENT"),
//!         StreamEvent::DocWriteEnd,
//!         StreamEvent::text(" bye"),
//!     ]
//! );
//! ```
use alloc::string::String;

/// One structural event recognized in a model response.
///
/// Events are emitted in stream order. Content-carrying variants are never
/// empty. A block opened by [`DocWriteBegin`](Self::DocWriteBegin) is closed
/// by exactly one [`DocWriteEnd`](Self::DocWriteEnd); a block opened by
/// [`ReplaceBegin`](Self::ReplaceBegin) or
/// [`SearchOverflow`](Self::SearchOverflow) is closed by exactly one
/// [`ReplaceEnd`](Self::ReplaceEnd). The only exception is a stream that ends
/// inside a block, which leaves it open.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Chat prose.
    Text {
        /// The prose itself.
        content: String,
    },
    /// The document is about to be rewritten from scratch.
    DocWriteBegin,
    /// The next piece of the rewritten document.
    DocWriteChunk {
        /// Text to append to the document.
        content: String,
    },
    /// The full-document write is complete.
    DocWriteEnd,
    /// A targeted replace, carrying its whitespace-trimmed search excerpt.
    ReplaceBegin {
        /// The excerpt to find, trimmed of surrounding whitespace.
        search: String,
    },
    /// The next piece of the replacement body.
    ReplaceChunk {
        /// Text to insert at the cursor.
        content: String,
    },
    /// The targeted replace is complete.
    ReplaceEnd,
    /// A targeted replace whose excerpt outgrew the configured bound. Opens
    /// the block in place of `ReplaceBegin`.
    SearchOverflow,
}

impl StreamEvent {
    /// Shorthand for [`StreamEvent::Text`].
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Shorthand for [`StreamEvent::DocWriteChunk`].
    pub fn doc_chunk(content: impl Into<String>) -> Self {
        Self::DocWriteChunk {
            content: content.into(),
        }
    }

    /// Shorthand for [`StreamEvent::ReplaceBegin`].
    pub fn replace_begin(search: impl Into<String>) -> Self {
        Self::ReplaceBegin {
            search: search.into(),
        }
    }

    /// Shorthand for [`StreamEvent::ReplaceChunk`].
    pub fn replace_chunk(content: impl Into<String>) -> Self {
        Self::ReplaceChunk {
            content: content.into(),
        }
    }

    /// The streamed payload of `Text`, `DocWriteChunk` and `ReplaceChunk`.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text { content }
            | Self::DocWriteChunk { content }
            | Self::ReplaceChunk { content } => Some(content),
            _ => None,
        }
    }

    /// Append `next` onto `self` when both are content events of the same
    /// kind; otherwise hand `next` back.
    pub(crate) fn try_merge(&mut self, next: StreamEvent) -> Result<(), StreamEvent> {
        match (self, next) {
            (Self::Text { content }, Self::Text { content: more })
            | (Self::DocWriteChunk { content }, Self::DocWriteChunk { content: more })
            | (Self::ReplaceChunk { content }, Self::ReplaceChunk { content: more }) => {
                content.push_str(&more);
                Ok(())
            }
            (_, next) => Err(next),
        }
    }
}
