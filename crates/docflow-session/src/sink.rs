use docflow::PatchObserver;

/// Receives the visible progress of a turn.
///
/// Both methods default to no-ops; `()` discards everything.
pub trait TurnSink {
    /// The model's chat message for this turn grew.
    fn on_transcript(&mut self, _transcript: &str) {}

    /// The document changed, or the model started or stopped writing.
    fn on_document(&mut self, _document: &str, _writing: bool) {}
}

impl TurnSink for () {}

/// Forwards patch engine notifications to a [`TurnSink`].
pub(crate) struct SinkObserver<'s, S: ?Sized>(pub(crate) &'s mut S);

impl<S: TurnSink + ?Sized> PatchObserver for SinkObserver<'_, S> {
    fn on_chat(&mut self, transcript: &str) {
        self.0.on_transcript(transcript);
    }

    fn on_document(&mut self, document: &str, writing: bool) {
        self.0.on_document(document, writing);
    }
}
