//! Incremental tokenizer for the delimiter grammar.
//!
//! Overview
//! - Each [`Tokenizer::advance`] appends a fragment to an internal buffer and
//!   returns a lazy iterator. Every `next()` re-scans the buffer from its
//!   start in the current [`ParserMode`] and either emits one event, performs
//!   a silent transition, or stalls because the rest of the buffer is still
//!   ambiguous.
//! - A step can produce two events at once (the text before a delimiter and
//!   the event for the delimiter itself). The second one is stashed in
//!   `pending` and handed out by the following `next()`.
//!
//! Withholding
//! - Outside of search capture, buffered text is streamed out eagerly, except
//!   for the longest suffix that is a proper prefix of a delimiter valid in
//!   the current mode. That suffix stays buffered until the next fragment
//!   either completes the delimiter or proves it was plain text.
//! - In prose, an opener is only taken once no other opener could still begin
//!   earlier in the buffer, so the earliest opener wins regardless of where
//!   fragments are cut.
//!
//! Search capture
//! - The excerpt is never streamed: it is released whole, trimmed, as
//!   [`StreamEvent::ReplaceBegin`]. `scanned` remembers how much of the
//!   buffer is known not to start the `replace` delimiter so that a long
//!   excerpt is not searched quadratically.
//! - An excerpt that grows past `max_search_len` is abandoned with
//!   [`StreamEvent::SearchOverflow`]. The decision only depends on the length
//!   of the excerpt, never on fragment boundaries.
//!
//! Drop semantics
//! - All state lives in the tokenizer, not in the iterators. Dropping an
//!   [`Advance`] before it is exhausted loses nothing; the next call resumes
//!   where it stopped.
//!
//! End of input
//! - [`Tokenizer::finalize`] flushes withheld prose. A block that is still open
//!   is truncated: its buffered content is discarded and no closing event is
//!   synthesized.

use alloc::{string::String, vec::Vec};
use core::mem;

use tracing::{debug, trace, warn};

use crate::{
    delimiter::{Delimiters, Opener, ParserMode, partial_suffix_len},
    event::StreamEvent,
    options::TokenizerOptions,
};

/// Outcome of a single scan of the buffer.
enum Step {
    /// Emit an event, optionally followed by a second one.
    Emit(StreamEvent, Option<StreamEvent>),
    /// A transition happened without producing an event; scan again.
    Continue,
    /// Nothing more can be decided without further input.
    Stall,
}

/// Incremental tokenizer for one model turn.
///
/// # Examples
///
/// ```
/// use docflow::{ParserMode, StreamEvent, Tokenizer, TokenizerOptions};
///
/// let mut tokenizer = Tokenizer::new(TokenizerOptions::default());
/// let events: Vec<_> = tokenizer.advance("Here you go :::START").collect();
/// assert_eq!(events, vec![StreamEvent::text("Here you go ")]);
///
/// let events: Vec<_> = tokenizer.advance("_DOC:::Dear Sir").collect();
/// assert_eq!(
///     events,
///     vec![StreamEvent::DocWriteBegin, StreamEvent::doc_chunk("Dear Sir")]
/// );
/// assert_eq!(tokenizer.mode(), ParserMode::FullWrite);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    buffer: String,
    mode: ParserMode,
    delimiters: Delimiters,
    max_search_len: Option<usize>,
    /// Prefix of `buffer` known not to contain the start of the `replace`
    /// delimiter. Only meaningful in search capture.
    scanned: usize,
    /// The current excerpt was abandoned; its bytes are being dropped.
    search_overflowed: bool,
    pending: Option<StreamEvent>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerOptions::default())
    }
}

impl Tokenizer {
    /// Create a tokenizer in [`ParserMode::Prose`].
    #[must_use]
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            buffer: String::new(),
            mode: ParserMode::Prose,
            delimiters: options.delimiters,
            max_search_len: options.max_search_len,
            scanned: 0,
            search_overflowed: false,
            pending: None,
        }
    }

    /// The current interpretation context.
    #[must_use]
    pub fn mode(&self) -> ParserMode {
        self.mode
    }

    /// Input received but not yet turned into events.
    #[must_use]
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Feed the next fragment and iterate over the events it completes.
    pub fn advance<'t>(&'t mut self, fragment: &str) -> Advance<'t> {
        self.buffer.push_str(fragment);
        Advance { tokenizer: self }
    }

    /// Signal the end of the stream and iterate over the remaining events.
    #[must_use]
    pub fn finalize(self) -> Finalize {
        Finalize {
            tokenizer: self,
            done: false,
        }
    }

    fn next_event(&mut self, end_of_input: bool) -> Option<StreamEvent> {
        loop {
            if let Some(event) = self.pending.take() {
                return Some(event);
            }
            match self.step(end_of_input) {
                Step::Emit(event, then) => {
                    self.pending = then;
                    return Some(event);
                }
                Step::Continue => {}
                Step::Stall => return None,
            }
        }
    }

    fn step(&mut self, end_of_input: bool) -> Step {
        match self.mode {
            ParserMode::Prose => self.step_prose(end_of_input),
            ParserMode::FullWrite | ParserMode::ReplaceWrite => self.step_body(),
            ParserMode::SearchCapture => self.step_search(),
        }
    }

    fn step_prose(&mut self, end_of_input: bool) -> Step {
        let found = self.delimiters.find_opener(&self.buffer);

        // Text that could still become an opener ends the safe region. If an
        // opener is found after that point, a partial one might begin before
        // it, so wait.
        let safe = if end_of_input {
            self.buffer.len()
        } else {
            self.buffer.len() - self.delimiters.pending_suffix_len(ParserMode::Prose, &self.buffer)
        };

        match found {
            Some((at, opener)) if at <= safe => {
                let text = self.take_prefix(at);
                let delimiter_len = match opener {
                    Opener::Document => self.delimiters.start_doc().len(),
                    Opener::Search => self.delimiters.search().len(),
                };
                self.buffer.drain(..delimiter_len);

                let begin = match opener {
                    Opener::Document => {
                        self.enter(ParserMode::FullWrite);
                        Some(StreamEvent::DocWriteBegin)
                    }
                    Opener::Search => {
                        self.enter(ParserMode::SearchCapture);
                        None
                    }
                };

                match (non_empty(text).map(|content| StreamEvent::Text { content }), begin) {
                    (Some(text), then) => Step::Emit(text, then),
                    (None, Some(begin)) => Step::Emit(begin, None),
                    (None, None) => Step::Continue,
                }
            }
            _ => self.emit_prefix(safe, |content| StreamEvent::Text { content }),
        }
    }

    /// Stream the body of a full write or a replacement. At the end of input
    /// a partial closer stays behind and is discarded with the open block.
    fn step_body(&mut self) -> Step {
        let Some(closer) = self.delimiters.closer(self.mode) else {
            return Step::Stall;
        };
        let wrap: fn(String) -> StreamEvent = match self.mode {
            ParserMode::FullWrite => |content| StreamEvent::DocWriteChunk { content },
            _ => |content| StreamEvent::ReplaceChunk { content },
        };

        if let Some(at) = self.buffer.find(closer) {
            let closer_len = closer.len();
            let body = self.take_prefix(at);
            self.buffer.drain(..closer_len);
            let end = match self.mode {
                ParserMode::FullWrite => StreamEvent::DocWriteEnd,
                _ => StreamEvent::ReplaceEnd,
            };
            self.enter(ParserMode::Prose);
            return match non_empty(body) {
                Some(body) => Step::Emit(wrap(body), Some(end)),
                None => Step::Emit(end, None),
            };
        }

        let safe = self.buffer.len() - self.delimiters.pending_suffix_len(self.mode, &self.buffer);
        self.emit_prefix(safe, wrap)
    }

    fn step_search(&mut self) -> Step {
        let closer_len = self.delimiters.replace().len();
        let found = self.buffer[self.scanned..]
            .find(self.delimiters.replace())
            .map(|at| at + self.scanned);

        if let Some(at) = found {
            let excerpt = self.take_prefix(at);
            self.buffer.drain(..closer_len);
            self.scanned = 0;
            self.enter(ParserMode::ReplaceWrite);

            if mem::take(&mut self.search_overflowed) {
                return Step::Continue;
            }
            if self.exceeds_search_limit(excerpt.len()) {
                warn!(len = excerpt.len(), "search excerpt exceeds the configured limit");
                return Step::Emit(StreamEvent::SearchOverflow, None);
            }
            return Step::Emit(
                StreamEvent::ReplaceBegin {
                    search: String::from(excerpt.trim()),
                },
                None,
            );
        }

        // Everything before a possible partial `replace` delimiter certainly
        // belongs to the excerpt.
        let settled = self.buffer.len() - partial_suffix_len(&self.buffer, &[self.delimiters.replace()]);
        if self.search_overflowed {
            self.buffer.drain(..settled);
            self.scanned = 0;
            return Step::Stall;
        }
        if self.exceeds_search_limit(settled) {
            warn!(len = settled, "search excerpt exceeds the configured limit");
            self.buffer.drain(..settled);
            self.scanned = 0;
            self.search_overflowed = true;
            return Step::Emit(StreamEvent::SearchOverflow, None);
        }
        self.scanned = settled;
        Step::Stall
    }

    fn exceeds_search_limit(&self, len: usize) -> bool {
        self.max_search_len.is_some_and(|max| len > max)
    }

    fn enter(&mut self, mode: ParserMode) {
        trace!(from = ?self.mode, to = ?mode, "delimiter matched");
        self.mode = mode;
    }

    /// Split off and return the first `at` bytes of the buffer.
    fn take_prefix(&mut self, at: usize) -> String {
        let rest = self.buffer.split_off(at);
        mem::replace(&mut self.buffer, rest)
    }

    fn emit_prefix(&mut self, len: usize, wrap: fn(String) -> StreamEvent) -> Step {
        match non_empty(self.take_prefix(len)) {
            Some(content) => Step::Emit(wrap(content), None),
            None => Step::Stall,
        }
    }

    /// Drop whatever an unterminated block left behind.
    fn discard_unterminated(&mut self) {
        if self.mode != ParserMode::Prose {
            debug!(
                mode = ?self.mode,
                discarded = self.buffer.len(),
                "stream ended inside an open block"
            );
        }
        self.buffer.clear();
        self.scanned = 0;
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Events completed by one [`Tokenizer::advance`] call.
///
/// Dropping the iterator early keeps the unread input in the tokenizer.
#[derive(Debug)]
pub struct Advance<'t> {
    tokenizer: &'t mut Tokenizer,
}

impl Iterator for Advance<'_> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenizer.next_event(false)
    }
}

/// Remaining events after the stream ended; see [`Tokenizer::finalize`].
#[derive(Debug)]
pub struct Finalize {
    tokenizer: Tokenizer,
    done: bool,
}

impl Finalize {
    /// The mode the stream ended in.
    #[must_use]
    pub fn mode(&self) -> ParserMode {
        self.tokenizer.mode
    }
}

impl Iterator for Finalize {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let event = self.tokenizer.next_event(true);
        if event.is_none() {
            self.tokenizer.discard_unterminated();
            self.done = true;
        }
        event
    }
}

/// Tokenize a complete sequence of fragments.
///
/// ```
/// use docflow::{StreamEvent, TokenizerOptions, tokenize};
///
/// let events = tokenize([":::STA", "RT_DOC:::hi"], TokenizerOptions::default());
/// assert_eq!(events, vec![StreamEvent::DocWriteBegin, StreamEvent::doc_chunk("hi")]);
/// ```
pub fn tokenize<'a>(
    fragments: impl IntoIterator<Item = &'a str>,
    options: TokenizerOptions,
) -> Vec<StreamEvent> {
    let mut tokenizer = Tokenizer::new(options);
    let mut events = Vec::new();
    for fragment in fragments {
        events.extend(tokenizer.advance(fragment));
    }
    events.extend(tokenizer.finalize());
    events
}
