#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use docflow::{
    PatchEngine, PatchOptions, StreamEvent, Tokenizer, TokenizerOptions, chunk_utils::split_at_offsets,
    coalesce,
};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const HEADER: usize = 5; // knobs byte + 4-byte split seed

/// Separates the starting document from the model response in the payload.
const SEPARATOR: u8 = 0;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

/// Pieces spliced into generated inputs so the fuzzer reaches every mode
/// quickly instead of waiting to stumble on a 15-byte delimiter.
static PIECES: &[&str] = &[
    ":::START_DOC:::",
    ":::END_DOC:::",
    ":::SEARCH:::",
    ":::REPLACE:::",
    ":::END:::",
    ":",
    ":::",
    ":::SEA",
    ":::END",
    " ",
    "\n",
    "fox",
    "é",
    "🙂",
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Append pieces to `buf` until `limit` bytes would be exceeded. Returns the
/// number of bytes written.
fn append_pieces(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        let count = rng.random_range(1..=16);
        let mut written = 0;
        for _ in 0..count {
            let piece = PIECES[rng.random_range(0..PIECES.len())].as_bytes();
            if written + piece.len() > limit {
                break;
            }
            buf[written..written + piece.len()].copy_from_slice(piece);
            written += piece.len();
        }
        written
    })
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size <= HEADER + 1 {
        return fuzzer_mutate(data, size, max_size);
    }
    if size < HEADER || seed.is_multiple_of(10) {
        with_rng(|rng| rng.fill(&mut data[..HEADER]));

        let mut at = HEADER;
        at += append_pieces(&mut data[at..], max_size - at - 1);
        data[at] = SEPARATOR;
        at += 1;
        while at < max_size && at < size.max(HEADER + 64) {
            let written = append_pieces(&mut data[at..], max_size - at);
            if written == 0 {
                break;
            }
            at += written;
        }
        at
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Arbitrary, Debug)]
struct Knobs {
    tight_search: bool,
    split_seed: u32,
}

fn options(knobs: &Knobs) -> TokenizerOptions {
    TokenizerOptions {
        max_search_len: if knobs.tight_search { Some(16) } else { None },
        ..Default::default()
    }
}

/// Feed `fragments`, patch `document` and check the invariants after every
/// event.
fn run(document: &str, fragments: &[&str], options: TokenizerOptions) -> (Vec<StreamEvent>, String, String) {
    let mut tokenizer = Tokenizer::new(options);
    let mut engine = PatchEngine::new(document.to_owned(), PatchOptions::default());
    let mut events = Vec::new();

    let mut apply = |event: StreamEvent, engine: &mut PatchEngine| {
        assert!(event.content().is_none_or(|c| !c.is_empty()), "empty content event {event:?}");
        engine.apply(&event);
        engine.assert_invariants();
        events.push(event);
    };
    for fragment in fragments {
        for event in tokenizer.advance(fragment) {
            apply(event, &mut engine);
        }
    }
    for event in tokenizer.finalize() {
        apply(event, &mut engine);
    }

    let out = engine.finish();
    (coalesce(events).collect(), out.document, out.transcript)
}

fn turn(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let Ok(knobs) = Knobs::arbitrary(&mut Unstructured::new(&data[..HEADER])) else {
        return;
    };
    let payload = String::from_utf8_lossy(&data[HEADER..]).into_owned();
    let (document, response) = payload
        .split_once(char::from(SEPARATOR))
        .unwrap_or(("", payload.as_str()));

    let offsets = split_offsets(response.len(), knobs.split_seed);
    let fragments = split_at_offsets(response, &offsets);

    let whole = run(document, &[response], options(&knobs));
    let split = run(document, &fragments, options(&knobs));
    assert_eq!(whole, split, "fragments: {fragments:?}");
}

fuzz_target!(|data: &[u8]| turn(data));

/// Derive cut points from a fixed seed so a crashing input replays exactly.
fn split_offsets(len: usize, split_seed: u32) -> Vec<usize> {
    let mut rng = SmallRng::seed_from_u64(u64::from(split_seed));
    let cuts = if len == 0 { 0 } else { rng.random_range(0..=len.min(64)) };
    (0..cuts).map(|_| rng.random_range(0..=len)).collect()
}
