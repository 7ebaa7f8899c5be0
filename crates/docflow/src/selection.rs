use alloc::string::String;
use core::ops::Range;

use crate::error::SelectionError;

/// Streams a rewrite of a selected range into a document.
///
/// The selection stays in place until the first non-empty chunk arrives,
/// which replaces it. Later chunks are inserted right after the text written
/// so far, so the replacement grows contiguously from the selection start.
///
/// ```
/// use docflow::SelectionRewrite;
///
/// let mut rewrite = SelectionRewrite::new("one two three".into(), 4..7).unwrap();
/// rewrite.push("T");
/// assert_eq!(rewrite.document(), "one T three");
/// rewrite.push("WO");
/// assert_eq!(rewrite.document(), "one TWO three");
/// assert_eq!(rewrite.replacement(), "TWO");
/// ```
#[derive(Debug, Clone)]
pub struct SelectionRewrite {
    document: String,
    start: usize,
    end: usize,
    written: usize,
    started: bool,
}

impl SelectionRewrite {
    /// Prepare to rewrite `selection` within `document`.
    ///
    /// # Errors
    ///
    /// Fails if the range is inverted, runs past the document, or splits a
    /// UTF-8 code point.
    pub fn new(document: String, selection: Range<usize>) -> Result<Self, SelectionError> {
        let Range { start, end } = selection;
        if start > end {
            return Err(SelectionError::Inverted { start, end });
        }
        if end > document.len() {
            return Err(SelectionError::OutOfBounds {
                end,
                len: document.len(),
            });
        }
        for offset in [start, end] {
            if !document.is_char_boundary(offset) {
                return Err(SelectionError::NotCharBoundary(offset));
            }
        }
        Ok(Self {
            document,
            start,
            end,
            written: 0,
            started: false,
        })
    }

    /// The text currently selected, before any chunk arrived.
    #[must_use]
    pub fn selected(&self) -> &str {
        if self.started {
            ""
        } else {
            &self.document[self.start..self.end]
        }
    }

    /// Insert the next chunk of replacement text.
    pub fn push(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        if self.started {
            self.document.insert_str(self.start + self.written, chunk);
        } else {
            self.document.replace_range(self.start..self.end, chunk);
            self.started = true;
        }
        self.written += chunk.len();
    }

    /// The document as of the last chunk.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Replacement text written so far.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.document[self.start..self.start + self.written]
    }

    /// Whether any chunk has replaced the selection yet.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Hand the document back.
    #[must_use]
    pub fn finish(self) -> String {
        self.document
    }
}
