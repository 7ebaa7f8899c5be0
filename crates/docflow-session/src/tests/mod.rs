
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    StopToken, TurnSink,
    title::{TitleError, TitleSource},
};

/// Records everything a turn shows.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) transcripts: Vec<String>,
    pub(crate) documents: Vec<(String, bool)>,
}

impl TurnSink for Recorder {
    fn on_transcript(&mut self, transcript: &str) {
        self.transcripts.push(transcript.to_owned());
    }

    fn on_document(&mut self, document: &str, writing: bool) {
        self.documents.push((document.to_owned(), writing));
    }
}

/// Stops the turn as soon as the document shows any text.
pub(crate) struct StopOnText(pub(crate) StopToken);

impl TurnSink for StopOnText {
    fn on_document(&mut self, document: &str, _writing: bool) {
        if !document.is_empty() {
            self.0.stop();
        }
    }
}

/// Counts prompts and answers with a fixed title, or fails.
#[derive(Debug, Default)]
pub(crate) struct CountingTitle {
    pub(crate) calls: AtomicUsize,
    pub(crate) fail: bool,
}

impl TitleSource for CountingTitle {
    async fn generate(&self, _prompt: &str) -> Result<String, TitleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(TitleError("quota exceeded".into()))
        } else {
            Ok("'Counted Title'".into())
        }
    }
}
