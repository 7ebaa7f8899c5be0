//! Applies tokenizer events to a document and a chat transcript.
//!
//! The engine is a reducer: every [`StreamEvent`] is applied synchronously,
//! in stream order, so the document observed after an event reflects exactly
//! the events processed so far.
//!
//! Targeted replaces work in two phases. [`StreamEvent::ReplaceBegin`] cuts
//! the first exact occurrence of the excerpt out of the document and parks an
//! insertion cursor at its start; every following
//! [`StreamEvent::ReplaceChunk`] is inserted at the cursor, which then moves
//! past the inserted text. When the excerpt is not in the document the cursor
//! stays unset, a notice goes to the transcript, and the replacement body is
//! dropped.

use alloc::{borrow::Cow, string::String};

use tracing::{trace, warn};

use crate::{event::StreamEvent, options::PatchOptions};

/// Hooks for consumers that render the turn while it streams.
///
/// Every method has a no-op default, so implementors only override what they
/// display. `()` ignores everything.
pub trait PatchObserver {
    /// The chat transcript grew.
    fn on_chat(&mut self, _transcript: &str) {}

    /// The document or the writing flag changed.
    fn on_document(&mut self, _document: &str, _writing: bool) {}

    /// A full-document write completed; a good moment to refresh the title.
    fn on_document_written(&mut self, _document: &str) {}

    /// A targeted replace could not be applied. `search` is empty when the
    /// excerpt was abandoned for being too long.
    fn on_search_miss(&mut self, _search: &str) {}
}

impl PatchObserver for () {}

/// Counters describing what a turn did to the document.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Completed full-document writes.
    pub doc_writes: usize,
    /// Targeted replaces whose excerpt was found.
    pub replacements: usize,
    /// Targeted replaces that could not be applied.
    pub search_misses: usize,
}

/// Final state handed back by [`PatchEngine::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutput {
    /// The document after the turn.
    pub document: String,
    /// Chat prose of the turn, including notices.
    pub transcript: String,
    /// What happened to the document.
    pub stats: PatchStats,
}

/// Applies [`StreamEvent`]s to a document it owns for one turn.
///
/// # Examples
///
/// ```
/// use docflow::{PatchEngine, PatchOptions, StreamEvent};
///
/// let mut engine = PatchEngine::new("Hello world".into(), PatchOptions::default());
/// engine.apply(&StreamEvent::replace_begin("world"));
/// assert_eq!(engine.document(), "Hello ");
/// assert_eq!(engine.cursor(), Some(6));
///
/// engine.apply(&StreamEvent::replace_chunk("there"));
/// engine.apply(&StreamEvent::ReplaceEnd);
/// assert_eq!(engine.document(), "Hello there");
/// assert_eq!(engine.cursor(), None);
/// ```
#[derive(Debug, Clone)]
pub struct PatchEngine {
    document: String,
    transcript: String,
    cursor: Option<usize>,
    writing: bool,
    search_miss_notice: Cow<'static, str>,
    stats: PatchStats,
}

impl PatchEngine {
    /// Take ownership of `document` for the duration of a turn.
    #[must_use]
    pub fn new(document: String, options: PatchOptions) -> Self {
        Self {
            document,
            transcript: String::new(),
            cursor: None,
            writing: false,
            search_miss_notice: options.search_miss_notice,
            stats: PatchStats::default(),
        }
    }

    /// The document as of the last applied event.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Chat prose received so far.
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Insertion offset of the replace in progress, if its excerpt was found.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the agent is currently writing into the document.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.writing
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    /// Apply one event without observing it.
    pub fn apply(&mut self, event: &StreamEvent) {
        self.apply_with(event, &mut ());
    }

    /// Apply one event and report the visible changes to `observer`.
    pub fn apply_with<O: PatchObserver + ?Sized>(&mut self, event: &StreamEvent, observer: &mut O) {
        match event {
            StreamEvent::Text { content } => {
                self.transcript.push_str(content);
                observer.on_chat(&self.transcript);
            }
            StreamEvent::DocWriteBegin => {
                self.document.clear();
                self.cursor = None;
                self.writing = true;
                observer.on_document(&self.document, self.writing);
            }
            StreamEvent::DocWriteChunk { content } => {
                self.document.push_str(content);
                observer.on_document(&self.document, self.writing);
            }
            StreamEvent::DocWriteEnd => {
                self.writing = false;
                self.stats.doc_writes += 1;
                observer.on_document(&self.document, self.writing);
                observer.on_document_written(&self.document);
            }
            StreamEvent::ReplaceBegin { search } => match self.locate(search) {
                Some(start) => {
                    trace!(start, len = search.len(), "replacing excerpt");
                    self.document.replace_range(start..start + search.len(), "");
                    self.cursor = Some(start);
                    self.writing = true;
                    self.stats.replacements += 1;
                    observer.on_document(&self.document, self.writing);
                }
                None => {
                    warn!(len = search.len(), "search excerpt not found in document");
                    self.miss(search, observer);
                }
            },
            StreamEvent::SearchOverflow => self.miss("", observer),
            StreamEvent::ReplaceChunk { content } => {
                // Without a matched excerpt the body has nowhere to go; the
                // miss notice already told the user.
                if let Some(at) = self.cursor {
                    self.document.insert_str(at, content);
                    self.cursor = Some(at + content.len());
                    observer.on_document(&self.document, self.writing);
                }
            }
            StreamEvent::ReplaceEnd => {
                self.cursor = None;
                if self.writing {
                    self.writing = false;
                    observer.on_document(&self.document, self.writing);
                }
            }
        }
        debug_assert!(self.cursor.is_none_or(|at| at <= self.document.len()));
    }

    /// Hand the document back together with the transcript.
    #[must_use]
    pub fn finish(self) -> PatchOutput {
        PatchOutput {
            document: self.document,
            transcript: self.transcript,
            stats: self.stats,
        }
    }

    /// Check the cursor invariant, panicking with context if it is broken.
    ///
    /// # Panics
    ///
    /// Panics if the cursor lies past the end of the document or inside a
    /// UTF-8 code point.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn assert_invariants(&self) {
        if let Some(at) = self.cursor {
            assert!(
                at <= self.document.len() && self.document.is_char_boundary(at),
                "cursor {at} is invalid for a document of {} bytes",
                self.document.len()
            );
        }
    }

    /// First exact occurrence of `search`. An empty excerpt occurs at 0, so
    /// its body is prepended.
    fn locate(&self, search: &str) -> Option<usize> {
        self.document.find(search)
    }

    fn miss<O: PatchObserver + ?Sized>(&mut self, search: &str, observer: &mut O) {
        self.cursor = None;
        self.stats.search_misses += 1;
        self.transcript.push_str(&self.search_miss_notice);
        observer.on_search_miss(search);
        observer.on_chat(&self.transcript);
    }
}
