mod delimiters;
mod patch_cases;

use alloc::vec::Vec;

use crate::{StreamEvent, TokenizerOptions, coalesce, tokenize};

/// Tokenize with default options and merge adjacent content events.
pub(crate) fn coalesced<'a>(fragments: impl IntoIterator<Item = &'a str>) -> Vec<StreamEvent> {
    coalesce(tokenize(fragments, TokenizerOptions::default())).collect()
}
