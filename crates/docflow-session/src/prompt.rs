//! Builds the requests sent to the model.
//!
//! Chat turns carry a system prompt that teaches the delimiter grammar and a
//! user prompt that embeds the whole current document ahead of the query.
//! Selection edits ask for raw replacement text and use no grammar at all.

use docflow::Delimiters;

use crate::model::{Message, TurnRequest};

/// Marker placed before the document in a chat prompt.
pub const DOCUMENT_START_MARKER: &str = "[CURRENT DOCUMENT CONTENT START]";

/// Marker placed after the document in a chat prompt.
pub const DOCUMENT_END_MARKER: &str = "[CURRENT DOCUMENT CONTENT END]";

/// Standing instructions for a chat turn, written in terms of `delimiters`.
#[must_use]
pub fn system_prompt(delimiters: &Delimiters) -> String {
    let mut out = String::from(
        "You are DocFlow, a friendly writing co-pilot. You help the user write, edit \
         and refine a document.\n\
         \n\
         Keep a relaxed, professional tone and be concise.\n\
         \n\
         RULES:\n\
         1. Prefer targeted edits. When asked to change, fix, rewrite or add to a specific \
         part of the document, use the targeted edit format. Never rewrite the full document \
         unless the user asks for it or the document is empty.\n\
         2. You have read the document. Refer to it naturally.\n\
         \n",
    );
    out.push_str(&format!(
        "TARGETED EDIT (the default):\n\
         {search}\n\
         [Exact text to find. It must match the document exactly, including punctuation and \
         whitespace.]\n\
         {replace}\n\
         [The new text.]\n\
         {end_replace}\n\
         \n\
         To insert text, search for the sentence right before the insertion point and repeat \
         it in the replacement followed by the new content.\n\
         \n\
         FULL DOCUMENT WRITE (only for a new document or when asked to rewrite everything):\n\
         {start_doc}\n\
         [The complete document]\n\
         {end_doc}\n",
        search = delimiters.search(),
        replace = delimiters.replace(),
        end_replace = delimiters.end_replace(),
        start_doc = delimiters.start_doc(),
        end_doc = delimiters.end_doc(),
    ));
    out
}

/// The user prompt of a chat turn: the document between markers, then the
/// query.
#[must_use]
pub fn chat_prompt(document: &str, query: &str) -> String {
    format!("{DOCUMENT_START_MARKER}\n{document}\n{DOCUMENT_END_MARKER}\n\nUser Query: {query}")
}

/// Request for a chat turn.
#[must_use]
pub fn chat_request(
    history: &[Message],
    document: &str,
    query: &str,
    delimiters: &Delimiters,
) -> TurnRequest {
    TurnRequest {
        system_prompt: Some(system_prompt(delimiters)),
        history: history.to_vec(),
        prompt: chat_prompt(document, query),
    }
}

/// Request for rewriting `selection` within `document`.
#[must_use]
pub fn selection_request(document: &str, selection: &str, instruction: &str) -> TurnRequest {
    TurnRequest {
        system_prompt: None,
        history: Vec::new(),
        prompt: format!(
            "You are an editor.\n\
             \n\
             Instruction: {instruction}\n\
             \n\
             Selected text to replace:\n\
             \"{selection}\"\n\
             \n\
             Full document for context:\n\
             {document}\n\
             \n\
             Output ONLY the replacement for the selected text. No quotes, no explanation."
        ),
    }
}
