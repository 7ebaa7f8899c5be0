//! Incremental tokenizer and document patch engine for streamed model edits.
//!
//! A language model co-authoring a document answers with free prose that may
//! embed two instruction blocks:
//!
//! ```text
//! :::START_DOC:::  <document text>     :::END_DOC:::
//! :::SEARCH:::     <verbatim excerpt>  :::REPLACE:::  <replacement>  :::END:::
//! ```
//!
//! The response arrives in arbitrary fragments, so delimiters can be cut
//! anywhere. [`Tokenizer`] turns the fragments into an ordered sequence of
//! [`StreamEvent`]s, and [`PatchEngine`] folds those events into a live
//! document plus a chat transcript.
//!
//! ```
//! use docflow::{PatchEngine, PatchOptions, Tokenizer, TokenizerOptions};
//!
//! let mut tokenizer = Tokenizer::new(TokenizerOptions::default());
//! let mut engine = PatchEngine::new("The fox jumps.".into(), PatchOptions::default());
//!
//! for fragment in ["Sure! :::SEA", "RCH:::The fox", " jumps.:::REPLACE:::The cat", " leaps.:::END:::"] {
//!     for event in tokenizer.advance(fragment) {
//!         engine.apply(&event);
//!     }
//! }
//! for event in tokenizer.finalize() {
//!     engine.apply(&event);
//! }
//!
//! let output = engine.finish();
//! assert_eq!(output.document, "The cat leaps.");
//! assert_eq!(output.transcript, "Sure! ");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod coalesce;
mod delimiter;
mod error;
mod event;
mod options;
mod patch;
mod selection;
mod tokenizer;

pub mod chunk_utils;

#[cfg(test)]
mod tests;

pub use coalesce::{Coalesce, coalesce};
pub use delimiter::{Delimiters, ParserMode};
pub use error::{DelimiterError, SelectionError};
pub use event::StreamEvent;
pub use options::{DEFAULT_MAX_SEARCH_LEN, DEFAULT_SEARCH_MISS_NOTICE, PatchOptions, TokenizerOptions};
pub use patch::{PatchEngine, PatchObserver, PatchOutput, PatchStats};
pub use selection::SelectionRewrite;
pub use tokenizer::{Advance, Finalize, Tokenizer, tokenize};
