use alloc::{string::ToString, vec, vec::Vec};

use rstest::rstest;

use crate::{
    DelimiterError, Delimiters, ParserMode, StreamEvent, Tokenizer, TokenizerOptions, coalesce,
    delimiter::partial_suffix_len,
};

fn tags() -> Delimiters {
    Delimiters::new("<doc>", "</doc>", "<find>", "<with>", "</find>").unwrap()
}

#[test]
fn default_set_matches_prompt_grammar() {
    let set = Delimiters::default();
    assert_eq!(set.start_doc(), ":::START_DOC:::");
    assert_eq!(set.end_doc(), ":::END_DOC:::");
    assert_eq!(set.search(), ":::SEARCH:::");
    assert_eq!(set.replace(), ":::REPLACE:::");
    assert_eq!(set.end_replace(), ":::END:::");
}

#[rstest]
#[case::start_doc(["", "b", "c", "d", "e"], DelimiterError::Empty("document start"))]
#[case::end_replace(["a", "b", "c", "d", ""], DelimiterError::Empty("replace end"))]
#[case::same_openers(["<x>", "b", "<x>", "d", "e"], DelimiterError::IdenticalOpeners("<x>".to_string()))]
fn invalid_sets_are_rejected(#[case] set: [&'static str; 5], #[case] expected: DelimiterError) {
    let [a, b, c, d, e] = set;
    assert_eq!(Delimiters::new(a, b, c, d, e).unwrap_err(), expected);
}

#[test]
fn error_messages_name_the_problem() {
    assert_eq!(
        DelimiterError::Empty("search").to_string(),
        "the search delimiter must not be empty"
    );
}

#[rstest]
#[case::nothing("plain", 0)]
#[case::one_colon("a:", 1)]
#[case::three_colons("a:::", 3)]
#[case::partial_keyword("a:::SEAR", 7)]
#[case::trailing_colons_of_complete_opener(":::SEARCH:::", 3)]
#[case::colon_after_text("a:::x:", 1)]
fn prose_suffix_withholding(#[case] buffer: &str, #[case] expected: usize) {
    let set = Delimiters::default();
    assert_eq!(set.pending_suffix_len(ParserMode::Prose, buffer), expected);
}

#[test]
fn withholding_only_considers_mode_delimiters() {
    let set = Delimiters::default();
    assert_eq!(set.pending_suffix_len(ParserMode::FullWrite, "x:::END_"), 7);
    assert_eq!(set.pending_suffix_len(ParserMode::FullWrite, "x:::S"), 0);
    assert_eq!(set.pending_suffix_len(ParserMode::ReplaceWrite, "x:::END_"), 0);
}

#[test]
fn partial_suffix_respects_char_boundaries() {
    assert_eq!(partial_suffix_len("🙂", &["🙂🙂"]), 4);
    assert_eq!(partial_suffix_len("a🙂", &["🙂x"]), 4);
    assert_eq!(partial_suffix_len("abc", &[]), 0);
}

#[test]
fn custom_delimiters_drive_the_tokenizer() {
    let mut tokenizer = Tokenizer::new(TokenizerOptions {
        delimiters: tags(),
        ..Default::default()
    });

    let mut events = Vec::new();
    for fragment in ["ok <do", "c>body</d", "oc> <find>a<wi", "th>b</find>", " :::START_DOC:::"] {
        events.extend(tokenizer.advance(fragment));
    }
    events.extend(tokenizer.finalize());

    let events: Vec<_> = coalesce(events).collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::text("ok "),
            StreamEvent::DocWriteBegin,
            StreamEvent::doc_chunk("body"),
            StreamEvent::DocWriteEnd,
            StreamEvent::text(" "),
            StreamEvent::replace_begin("a"),
            StreamEvent::replace_chunk("b"),
            StreamEvent::ReplaceEnd,
            StreamEvent::text(" :::START_DOC:::"),
        ]
    );
}

#[test]
fn tied_openers_go_to_document() {
    let set = Delimiters::new("<<", ">>", "<<<", "||", "##").unwrap();
    let mut tokenizer = Tokenizer::new(TokenizerOptions {
        delimiters: set,
        ..Default::default()
    });
    let events: Vec<_> = tokenizer.advance("x<<<y>>").collect();
    assert_eq!(
        events,
        vec![
            StreamEvent::text("x"),
            StreamEvent::DocWriteBegin,
            StreamEvent::doc_chunk("<y"),
            StreamEvent::DocWriteEnd,
        ]
    );
}
