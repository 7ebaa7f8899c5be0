use thiserror::Error;

/// Rejected custom delimiter set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelimiterError {
    /// A delimiter is the empty string and would match everywhere.
    #[error("the {0} delimiter must not be empty")]
    Empty(&'static str),
    /// Both prose openers are the same literal, so a block could never be
    /// told apart from the other.
    #[error("the document and search openers are both {0:?}")]
    IdenticalOpeners(alloc::string::String),
}

/// Rejected selection range for a [`SelectionRewrite`](crate::SelectionRewrite).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// `start` lies after `end`.
    #[error("selection starts at {start} but ends at {end}")]
    Inverted {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
    },
    /// `end` lies past the end of the document.
    #[error("selection ends at {end} but the document is {len} bytes long")]
    OutOfBounds {
        /// Requested end offset.
        end: usize,
        /// Document length in bytes.
        len: usize,
    },
    /// An offset splits a UTF-8 code point.
    #[error("selection offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}
