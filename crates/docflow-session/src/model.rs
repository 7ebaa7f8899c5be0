//! The upstream side of a turn: requests, messages and the streaming client.

use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{Mutex, PoisonError},
    task::{Context, Poll},
};

use futures_core::Stream;
use thiserror::Error;

/// Who wrote a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The human author.
    User,
    /// The language model.
    Model,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Text as the author wrote it. Model messages hold the chat transcript
    /// of their turn, without the instruction blocks.
    pub content: String,
}

impl Message {
    /// A message from the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// A message from the model.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// Everything a [`ModelClient`] needs to start streaming a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    /// Standing instructions, when the turn uses any.
    pub system_prompt: Option<String>,
    /// Earlier messages, oldest first.
    pub history: Vec<Message>,
    /// The message for this turn.
    pub prompt: String,
}

/// Failure reported by the model transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The model could not be reached.
    #[error("could not reach the model: {0}")]
    Connection(String),
    /// The model refused the request.
    #[error("the model rejected the request: {0}")]
    Rejected(String),
    /// The stream broke off after it had started.
    #[error("the response stream was interrupted: {0}")]
    Interrupted(String),
}

/// Fragments of a streamed response, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// A language model that answers a [`TurnRequest`] with a stream of text
/// fragments.
///
/// Fragments may be cut anywhere, including inside delimiters and, for
/// transports that decode lazily, between any two characters.
pub trait ModelClient {
    /// Start streaming the response to `request`.
    fn stream(&self, request: &TurnRequest) -> FragmentStream;
}

/// A [`ModelClient`] that replays a scripted response.
///
/// Every call to [`stream`](ModelClient::stream) replays the same script and
/// records the request, which makes it convenient for tests and demos.
#[derive(Debug, Default)]
pub struct ReplayClient {
    script: Vec<Result<String, TransportError>>,
    stall: bool,
    requests: Mutex<Vec<TurnRequest>>,
}

impl ReplayClient {
    /// Replay `script` item by item.
    pub fn new(script: impl IntoIterator<Item = Result<String, TransportError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            stall: false,
            requests: Mutex::default(),
        }
    }

    /// Replay `fragments` and then end the stream.
    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(fragments.into_iter().map(|f| Ok(f.to_owned())))
    }

    /// Keep the stream open after the script runs out instead of ending it,
    /// like a model that stopped sending without closing the connection.
    #[must_use]
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<TurnRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ModelClient for ReplayClient {
    fn stream(&self, request: &TurnRequest) -> FragmentStream {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Box::pin(Replay {
            items: self.script.iter().cloned().collect(),
            stall: self.stall,
        })
    }
}

struct Replay {
    items: VecDeque<Result<String, TransportError>>,
    stall: bool,
}

impl Stream for Replay {
    type Item = Result<String, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.items.pop_front() {
            Some(item) => Poll::Ready(Some(item)),
            // Nothing will ever wake this task again; only a stop can end it.
            None if self.stall => Poll::Pending,
            None => Poll::Ready(None),
        }
    }
}
