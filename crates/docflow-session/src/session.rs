use std::{borrow::Cow, future::poll_fn, ops::Range};

use docflow::{
    PatchEngine, PatchOptions, PatchOutput, PatchStats, SelectionError, SelectionRewrite,
    StreamEvent, Tokenizer, TokenizerOptions,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    model::{FragmentStream, Message, ModelClient, TransportError},
    prompt,
    sink::{SinkObserver, TurnSink},
    stop::StopToken,
    title::{self, TitleSource, UNTITLED},
};

/// Chat notice appended when the model stream fails mid-turn.
pub const TRANSPORT_ERROR_NOTICE: &str = "\n[Error generating response]";

/// Configuration for a [`Session`].
///
/// # Examples
///
/// ```
/// use docflow::TokenizerOptions;
/// use docflow_session::SessionOptions;
///
/// let options = SessionOptions {
///     tokenizer: TokenizerOptions {
///         max_search_len: Some(4096),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// # let _ = options;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Options for each turn's tokenizer. Its delimiters are also the ones
    /// the system prompt teaches the model.
    ///
    /// # Default
    ///
    /// [`TokenizerOptions::default`]
    pub tokenizer: TokenizerOptions,

    /// Options for each turn's patch engine.
    ///
    /// # Default
    ///
    /// [`PatchOptions::default`]
    pub patch: PatchOptions,

    /// Text appended to the transcript when the model stream fails.
    ///
    /// # Default
    ///
    /// [`TRANSPORT_ERROR_NOTICE`]
    pub transport_notice: Cow<'static, str>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            patch: PatchOptions::default(),
            transport_notice: Cow::Borrowed(TRANSPORT_ERROR_NOTICE),
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model finished its response.
    Completed,
    /// The turn was stopped through its [`StopToken`].
    Cancelled,
    /// The model stream failed; the transcript carries a notice.
    Failed(TransportError),
}

/// Summary of a chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// How the turn ended.
    pub outcome: TurnOutcome,
    /// What the turn did to the document.
    pub stats: PatchStats,
    /// The model's chat message, as appended to the history.
    pub transcript: String,
}

/// Summary of a selection edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    /// How the edit ended.
    pub outcome: TurnOutcome,
    /// The text that now stands where the selection was. Empty when no
    /// fragment arrived, in which case the selection is untouched.
    pub replacement: String,
}

/// Rejected session request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The selection does not describe a range of the document.
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// A document co-authored with a language model, one turn at a time.
///
/// The session keeps the document, its title and the conversation history
/// between turns. A turn borrows the session mutably, so turns never overlap.
#[derive(Debug)]
pub struct Session<C, T> {
    client: C,
    titles: T,
    document: String,
    title: String,
    history: Vec<Message>,
    options: SessionOptions,
}

impl<C: ModelClient, T: TitleSource> Session<C, T> {
    /// Start a session on `document`. The title stays [`UNTITLED`] until
    /// [`refresh_title`](Self::refresh_title) or a full rewrite sets it.
    pub fn new(client: C, titles: T, document: String, options: SessionOptions) -> Self {
        Self {
            client,
            titles,
            document,
            title: UNTITLED.to_owned(),
            history: Vec::new(),
            options,
        }
    }

    /// The document as of the last completed turn.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Replace the document, for instance after opening a file. History is
    /// kept.
    pub fn set_document(&mut self, document: String) {
        self.document = document;
    }

    /// The current title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the title by hand.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Conversation so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The model client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The title source.
    pub fn title_source(&self) -> &T {
        &self.titles
    }

    /// Ask the title source for a fresh title of the current document.
    pub async fn refresh_title(&mut self) -> &str {
        self.title = title::regenerate_title(&self.titles, &self.document).await;
        &self.title
    }

    /// Run one chat turn for `query`.
    ///
    /// Fragments are tokenized and applied one at a time as they arrive, and
    /// `sink` sees every visible change. Stopping through `stop` ends the turn
    /// at the next fragment boundary and keeps what was already applied; any
    /// text the tokenizer was still holding back is dropped. A transport
    /// failure appends [`SessionOptions::transport_notice`] to the transcript
    /// and ends the turn.
    ///
    /// Either way the query and the transcript join the history, and a turn
    /// that completed at least one full-document write refreshes the title.
    ///
    /// Dropping the returned future while the response is still streaming
    /// leaves the session exactly as it was before the turn.
    pub async fn run_turn<S: TurnSink + ?Sized>(
        &mut self,
        query: &str,
        sink: &mut S,
        stop: &StopToken,
    ) -> TurnReport {
        let request = prompt::chat_request(
            &self.history,
            &self.document,
            query,
            &self.options.tokenizer.delimiters,
        );
        info!(history = self.history.len(), "starting turn");

        let mut tokenizer = Tokenizer::new(self.options.tokenizer.clone());
        let mut engine = PatchEngine::new(self.document.clone(), self.options.patch.clone());
        let mut observer = SinkObserver(sink);
        let mut fragments = self.client.stream(&request);

        let outcome = loop {
            match next_fragment(&mut fragments, stop).await {
                Next::Stopped => {
                    debug!(mode = ?tokenizer.mode(), "turn stopped");
                    break TurnOutcome::Cancelled;
                }
                Next::Ended => {
                    for event in tokenizer.finalize() {
                        engine.apply_with(&event, &mut observer);
                    }
                    break TurnOutcome::Completed;
                }
                Next::Fragment(fragment) => {
                    for event in tokenizer.advance(&fragment) {
                        engine.apply_with(&event, &mut observer);
                    }
                }
                Next::Failed(err) => {
                    warn!(%err, "model stream failed");
                    let notice = StreamEvent::text(self.options.transport_notice.clone());
                    engine.apply_with(&notice, &mut observer);
                    break TurnOutcome::Failed(err);
                }
            }
        };

        if engine.is_writing() {
            observer.0.on_document(engine.document(), false);
        }
        let PatchOutput {
            document,
            transcript,
            stats,
        } = engine.finish();
        self.document = document;
        self.history.push(Message::user(query));
        self.history.push(Message::model(transcript.clone()));

        if stats.doc_writes > 0 {
            self.refresh_title().await;
        }
        info!(?outcome, ?stats, "turn finished");

        TurnReport {
            outcome,
            stats,
            transcript,
        }
    }

    /// Rewrite the `selection` byte range of the document following
    /// `instruction`.
    ///
    /// The model answers with raw replacement text. The first non-empty
    /// fragment replaces the selection and later ones extend the replacement
    /// in place. History and title are left alone.
    ///
    /// # Errors
    ///
    /// Fails before contacting the model if `selection` is not a valid range
    /// of the document.
    pub async fn run_selection_edit<S: TurnSink + ?Sized>(
        &mut self,
        selection: Range<usize>,
        instruction: &str,
        sink: &mut S,
        stop: &StopToken,
    ) -> Result<SelectionReport, SessionError> {
        let mut rewrite = SelectionRewrite::new(self.document.clone(), selection)?;
        let request = prompt::selection_request(&self.document, rewrite.selected(), instruction);
        info!(selected = rewrite.selected().len(), "starting selection edit");

        let mut fragments = self.client.stream(&request);
        let outcome = loop {
            match next_fragment(&mut fragments, stop).await {
                Next::Stopped => break TurnOutcome::Cancelled,
                Next::Ended => break TurnOutcome::Completed,
                Next::Fragment(fragment) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    rewrite.push(&fragment);
                    sink.on_document(rewrite.document(), true);
                }
                Next::Failed(err) => {
                    warn!(%err, "model stream failed during selection edit");
                    break TurnOutcome::Failed(err);
                }
            }
        };

        let replacement = rewrite.replacement().to_owned();
        if rewrite.is_started() {
            sink.on_document(rewrite.document(), false);
        }
        self.document = rewrite.finish();
        info!(?outcome, len = replacement.len(), "selection edit finished");

        Ok(SelectionReport {
            outcome,
            replacement,
        })
    }
}

enum Next {
    Stopped,
    Ended,
    Fragment(String),
    Failed(TransportError),
}

/// Wait for the next fragment unless `stop` fires first.
async fn next_fragment(fragments: &mut FragmentStream, stop: &StopToken) -> Next {
    tokio::select! {
        biased;
        () = stop.stopped() => Next::Stopped,
        item = poll_fn(|cx| fragments.as_mut().poll_next(cx)) => match item {
            None => Next::Ended,
            Some(Ok(fragment)) => Next::Fragment(fragment),
            Some(Err(err)) => Next::Failed(err),
        },
    }
}
