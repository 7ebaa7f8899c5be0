//! Helpers for cutting a response into fragments the way a streaming API
//! would. Used by tests, benchmarks and the fuzzer.

use alloc::vec::Vec;

/// Cut `payload` into `parts` fragments of roughly equal byte length, never
/// splitting a UTF-8 code point.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_fragments(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0, "cannot cut a payload into zero fragments");
    let step = payload.len().div_ceil(parts).max(1);
    let offsets: Vec<usize> = (1..parts).map(|i| i * step).collect();
    split_at_offsets(payload, &offsets)
}

/// Cut `payload` at the given byte offsets.
///
/// Offsets are taken in ascending order; an offset inside a code point moves
/// forward to the next boundary, and offsets that would produce an empty
/// fragment or run past the end are skipped.
///
/// ```
/// use docflow::chunk_utils::split_at_offsets;
///
/// assert_eq!(split_at_offsets("abcdef", &[2, 2, 5, 9]), vec!["ab", "cde", "f"]);
/// ```
#[must_use]
pub fn split_at_offsets<'a>(payload: &'a str, offsets: &[usize]) -> Vec<&'a str> {
    let mut sorted = offsets.to_vec();
    sorted.sort_unstable();

    let mut fragments = Vec::with_capacity(sorted.len() + 1);
    let mut start = 0;
    for mut at in sorted {
        while at < payload.len() && !payload.is_char_boundary(at) {
            at += 1;
        }
        if at <= start || at >= payload.len() {
            continue;
        }
        fragments.push(&payload[start..at]);
        start = at;
    }
    if start < payload.len() {
        fragments.push(&payload[start..]);
    }
    fragments
}
