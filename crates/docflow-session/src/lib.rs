//! Turn orchestration for co-authoring a document with a streaming language
//! model.
//!
//! A [`Session`] owns the document, its title and the conversation history.
//! Each call to [`Session::run_turn`] sends the user's query to a
//! [`ModelClient`], pipes the streamed fragments through a
//! [`docflow::Tokenizer`] and applies the resulting events to the document as
//! they arrive. A [`TurnSink`] sees every visible change, and a [`StopToken`]
//! ends the turn early without rolling back what was already written.
//!
//! ```
//! use docflow_session::{
//!     ReplayClient, Session, SessionOptions, StopToken, TurnOutcome, title::FixedTitle,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let client = ReplayClient::from_fragments([
//!     "On it. :::SEARCH:::teh:::REP",
//!     "LACE:::the:::END:::",
//! ]);
//! let mut session = Session::new(
//!     client,
//!     FixedTitle::new("Notes"),
//!     "Fix teh typo.".into(),
//!     SessionOptions::default(),
//! );
//!
//! let report = session.run_turn("fix the typo", &mut (), &StopToken::new()).await;
//! assert_eq!(report.outcome, TurnOutcome::Completed);
//! assert_eq!(session.document(), "Fix the typo.");
//! assert_eq!(report.transcript, "On it. ");
//! # });
//! ```

mod model;
mod session;
mod sink;
mod stop;

pub mod prompt;
pub mod title;

#[cfg(test)]
mod tests;

pub use model::{FragmentStream, Message, ModelClient, ReplayClient, Role, TransportError, TurnRequest};
pub use session::{
    SelectionReport, Session, SessionError, SessionOptions, TRANSPORT_ERROR_NOTICE, TurnOutcome,
    TurnReport,
};
pub use sink::TurnSink;
pub use stop::StopToken;
