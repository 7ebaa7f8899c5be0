use alloc::{
    borrow::Cow,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use rstest::rstest;

use crate::{
    DEFAULT_SEARCH_MISS_NOTICE, PatchEngine, PatchObserver, PatchOptions, PatchStats,
    SelectionError, SelectionRewrite, StreamEvent, TokenizerOptions, tokenize,
};

fn run(document: &str, fragments: &[&str]) -> PatchEngine {
    let mut engine = PatchEngine::new(document.to_string(), PatchOptions::default());
    for event in tokenize(fragments.iter().copied(), TokenizerOptions::default()) {
        engine.apply(&event);
        engine.assert_invariants();
    }
    engine
}

#[derive(Debug, Default)]
struct Recorder {
    chats: Vec<String>,
    documents: Vec<(String, bool)>,
    written: Vec<String>,
    misses: Vec<String>,
}

impl PatchObserver for Recorder {
    fn on_chat(&mut self, transcript: &str) {
        self.chats.push(transcript.to_string());
    }

    fn on_document(&mut self, document: &str, writing: bool) {
        self.documents.push((document.to_string(), writing));
    }

    fn on_document_written(&mut self, document: &str) {
        self.written.push(document.to_string());
    }

    fn on_search_miss(&mut self, search: &str) {
        self.misses.push(search.to_string());
    }
}

#[test]
fn replace_found_in_middle_of_document() {
    let engine = run(
        "Title\nThe fox jumps.\nEnd",
        &[":::SEARCH:::The fox jumps.:::REPLACE:::The cat leaps.:::END:::"],
    );
    assert_eq!(engine.document(), "Title\nThe cat leaps.\nEnd");
    assert_eq!(engine.transcript(), "");
    assert_eq!(engine.cursor(), None);
    assert!(!engine.is_writing());
    assert_eq!(
        engine.stats(),
        PatchStats {
            replacements: 1,
            ..PatchStats::default()
        }
    );
}

#[test]
fn missing_excerpt_leaves_document_and_posts_notice() {
    let engine = run(
        "Some other text",
        &["Editing. :::SEARCH:::Hello world:::REPLACE:::Bye:::END:::"],
    );
    assert_eq!(engine.document(), "Some other text");
    assert_eq!(
        engine.transcript(),
        alloc::format!("Editing. {DEFAULT_SEARCH_MISS_NOTICE}")
    );
    assert_eq!(engine.stats().search_misses, 1);
    assert_eq!(engine.stats().replacements, 0);
}

#[test]
fn replacement_chunks_land_contiguously() {
    let mut engine = PatchEngine::new("0123456789".into(), PatchOptions::default());
    engine.apply(&StreamEvent::replace_begin("345"));
    assert_eq!(engine.document(), "0126789");
    assert_eq!(engine.cursor(), Some(3));
    assert!(engine.is_writing());

    engine.apply(&StreamEvent::replace_chunk("A"));
    assert_eq!(engine.cursor(), Some(4));
    engine.apply(&StreamEvent::replace_chunk("B"));
    assert_eq!(engine.document(), "012AB6789");
    assert_eq!(engine.cursor(), Some(5));
}

#[test]
fn truncated_replace_keeps_deletion_and_streamed_body() {
    let engine = run("keep drop keep", &[":::SEARCH:::drop:::REPLACE:::new:::EN"]);
    let out = engine.finish();
    assert_eq!(out.document, "keep new keep");
    assert_eq!(out.stats.replacements, 1);

    let engine = run("keep drop keep", &[":::SEARCH:::drop:::REPLACE:::"]);
    assert_eq!(engine.document(), "keep  keep");
}

#[test]
fn only_first_occurrence_is_replaced() {
    let engine = run("a b a b", &[":::SEARCH:::a:::REPLACE:::c:::END:::"]);
    assert_eq!(engine.document(), "c b a b");
}

#[test]
fn successive_replaces_apply_in_order() {
    let engine = run(
        "one two three",
        &[
            ":::SEARCH:::one:::REPLACE:::1:::END:::",
            " and ",
            ":::SEARCH:::three:::REPLACE:::3:::END:::",
        ],
    );
    assert_eq!(engine.document(), "1 two 3");
    assert_eq!(engine.transcript(), " and ");
    assert_eq!(engine.stats().replacements, 2);
}

#[test]
fn full_write_replaces_document() {
    let engine = run(
        "old body",
        &["Here: :::START_DOC:::# New\n", "Body:::END_DOC::: done"],
    );
    assert_eq!(engine.document(), "# New\nBody");
    assert_eq!(engine.transcript(), "Here:  done");
    assert_eq!(engine.stats().doc_writes, 1);
}

#[test]
fn empty_full_write_clears_document() {
    let engine = run("old body", &[":::START_DOC::::::END_DOC:::"]);
    assert_eq!(engine.document(), "");
    assert_eq!(engine.stats().doc_writes, 1);
}

#[test]
fn unterminated_full_write_keeps_partial_document() {
    let engine = run("old body", &[":::START_DOC:::half a"]);
    assert_eq!(engine.document(), "half a");
    assert!(engine.is_writing());
    assert_eq!(engine.stats().doc_writes, 0);
}

#[test]
fn overflowed_excerpt_counts_as_miss() {
    let mut engine = PatchEngine::new("abc".into(), PatchOptions::default());
    let options = TokenizerOptions {
        max_search_len: Some(8),
        ..Default::default()
    };
    let response = ":::SEARCH:::0123456789abcdef:::REPLACE:::x:::END:::";
    for event in tokenize([response], options) {
        engine.apply(&event);
    }
    assert_eq!(engine.document(), "abc");
    assert_eq!(engine.transcript(), DEFAULT_SEARCH_MISS_NOTICE);
    assert_eq!(engine.stats().search_misses, 1);
}

#[rstest]
#[case::blank(&[":::SEARCH:::   :::REPLACE:::Intro. :::END:::"])]
#[case::empty(&[":::SEARCH::::::REPLACE:::Intro. :::END:::"])]
#[case::split(&[":::SEARCH:::\n", " :::REPLACE:::Int", "ro. :::END:::"])]
fn blank_excerpt_prepends_body(#[case] fragments: &[&str]) {
    let engine = run("Body text.", fragments);
    assert_eq!(engine.document(), "Intro. Body text.");
    assert_eq!(engine.transcript(), "");
    assert_eq!(
        engine.stats(),
        PatchStats {
            replacements: 1,
            ..PatchStats::default()
        }
    );
}

#[test]
fn custom_notice_is_used() {
    let mut engine = PatchEngine::new(
        String::new(),
        PatchOptions {
            search_miss_notice: Cow::Borrowed(" [miss]"),
        },
    );
    engine.apply(&StreamEvent::replace_begin("ghost"));
    engine.apply(&StreamEvent::replace_chunk("ignored"));
    engine.apply(&StreamEvent::ReplaceEnd);
    assert_eq!(engine.transcript(), " [miss]");
    assert_eq!(engine.document(), "");
}

#[test]
fn observer_sees_every_visible_change() {
    let mut engine = PatchEngine::new("x fox y".into(), PatchOptions::default());
    let mut recorder = Recorder::default();
    let events = tokenize(
        [
            "hi :::SEARCH:::fox:::REPLACE:::cat:::END:::",
            ":::SEARCH:::wolf:::REPLACE:::dog:::END:::",
            ":::START_DOC:::new:::END_DOC:::",
        ],
        TokenizerOptions::default(),
    );
    for event in &events {
        engine.apply_with(event, &mut recorder);
    }

    assert_eq!(
        recorder.chats,
        vec![
            "hi ".to_string(),
            alloc::format!("hi {DEFAULT_SEARCH_MISS_NOTICE}"),
        ]
    );
    assert_eq!(
        recorder.documents,
        vec![
            ("x  y".to_string(), true),
            ("x cat y".to_string(), true),
            ("x cat y".to_string(), false),
            (String::new(), true),
            ("new".to_string(), true),
            ("new".to_string(), false),
        ]
    );
    assert_eq!(recorder.misses, vec!["wolf".to_string()]);
    assert_eq!(recorder.written, vec!["new".to_string()]);
}

#[test]
fn stray_replace_end_is_harmless() {
    let mut engine = PatchEngine::new("doc".into(), PatchOptions::default());
    engine.apply(&StreamEvent::ReplaceEnd);
    engine.apply(&StreamEvent::replace_chunk("orphan"));
    assert_eq!(engine.document(), "doc");
    assert_eq!(engine.stats(), PatchStats::default());
}

#[test]
fn multibyte_excerpt_keeps_cursor_on_boundary() {
    let engine = run("naïve café", &[":::SEARCH:::café:::REPLACE:::thé", ":::END:::"]);
    assert_eq!(engine.document(), "naïve thé");
}

#[test]
fn selection_rewrite_streams_into_place() {
    let mut rewrite = SelectionRewrite::new("Hello brave world".into(), 6..11).unwrap();
    assert_eq!(rewrite.selected(), "brave");
    assert!(!rewrite.is_started());

    rewrite.push("");
    assert_eq!(rewrite.document(), "Hello brave world");

    for chunk in ["bo", "ld", " new"] {
        rewrite.push(chunk);
    }
    assert!(rewrite.is_started());
    assert_eq!(rewrite.replacement(), "bold new");
    assert_eq!(rewrite.finish(), "Hello bold new world");
}

#[test]
fn selection_without_chunks_is_untouched() {
    let rewrite = SelectionRewrite::new("abc".into(), 1..2).unwrap();
    assert_eq!(rewrite.replacement(), "");
    assert_eq!(rewrite.finish(), "abc");
}

#[test]
fn empty_selection_inserts() {
    let mut rewrite = SelectionRewrite::new("ac".into(), 1..1).unwrap();
    rewrite.push("b");
    assert_eq!(rewrite.document(), "abc");
}

#[rstest]
#[case::inverted("abc", 2..1, SelectionError::Inverted { start: 2, end: 1 })]
#[case::out_of_bounds("abc", 1..9, SelectionError::OutOfBounds { end: 9, len: 3 })]
#[case::mid_code_point("é", 0..1, SelectionError::NotCharBoundary(1))]
fn invalid_selection(
    #[case] document: &str,
    #[case] range: core::ops::Range<usize>,
    #[case] expected: SelectionError,
) {
    let err = SelectionRewrite::new(document.to_string(), range).unwrap_err();
    assert_eq!(err, expected);
}

#[test]
fn sentence_replaced_and_cursor_cleared() {
    let engine = run(
        "The fox jumps. The dog sleeps.",
        &[":::SEARCH:::The fox jumps.:::REPLACE:::The cat leaps.:::END:::"],
    );
    assert_eq!(engine.document(), "The cat leaps. The dog sleeps.");
    assert_eq!(engine.cursor(), None);
}

#[test]
fn goodbye_not_found_in_hello_world() {
    let engine = run(
        "Hello world",
        &[":::SEARCH:::Goodbye world:::REPLACE:::X:::END:::"],
    );
    assert_eq!(engine.document(), "Hello world");
    assert!(engine.transcript().contains("couldn't find the exact text"));
}
