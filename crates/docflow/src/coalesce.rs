use crate::event::StreamEvent;

/// Merge adjacent content events of the same kind.
///
/// Consecutive `Text`, `DocWriteChunk` or `ReplaceChunk` events are folded
/// into one; every other event passes through untouched. The tokenizer cuts
/// content wherever fragments happened to end, so coalescing the events of
/// a response yields the same sequence however it was fragmented.
///
/// ```
/// use docflow::{StreamEvent, coalesce};
///
/// let merged: Vec<_> = coalesce([
///     StreamEvent::text("Hel"),
///     StreamEvent::text("lo"),
///     StreamEvent::DocWriteBegin,
/// ])
/// .collect();
/// assert_eq!(merged, vec![StreamEvent::text("Hello"), StreamEvent::DocWriteBegin]);
/// ```
pub fn coalesce<I: IntoIterator<Item = StreamEvent>>(events: I) -> Coalesce<I::IntoIter> {
    Coalesce {
        inner: events.into_iter(),
        stash: None,
    }
}

/// Iterator returned by [`coalesce`].
#[derive(Debug, Clone)]
pub struct Coalesce<I> {
    inner: I,
    stash: Option<StreamEvent>,
}

impl<I: Iterator<Item = StreamEvent>> Iterator for Coalesce<I> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let mut current = self.stash.take().or_else(|| self.inner.next())?;
        for next in self.inner.by_ref() {
            if let Err(other) = current.try_merge(next) {
                self.stash = Some(other);
                break;
            }
        }
        Some(current)
    }
}
