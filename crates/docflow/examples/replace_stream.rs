//! Streams a targeted edit into a document and prints the document each time
//! it changes, the way an editor pane would repaint while the agent types.
//!
//! The response is fed in small, irregular fragments with seams inside the
//! delimiters, mirroring how chat-completion APIs deliver tokens.
//!
//! Run with
//!
//! ```bash
//! cargo run -p docflow --example replace_stream
//! ```

use docflow::{PatchEngine, PatchObserver, PatchOptions, Tokenizer, TokenizerOptions};

/// Prints every visible change to stdout.
struct Console {
    repaints: usize,
}

impl PatchObserver for Console {
    fn on_chat(&mut self, transcript: &str) {
        println!("[chat] {transcript}");
    }

    fn on_document(&mut self, document: &str, writing: bool) {
        self.repaints += 1;
        let marker = if writing { "writing" } else { "idle" };
        println!("[doc #{} {marker}]\n{document}\n", self.repaints);
    }

    fn on_search_miss(&mut self, search: &str) {
        eprintln!("could not locate {search:?}");
    }
}

fn main() {
    let document = "Dear team,\n\nThe launch moves to Friday.\n\nThanks\n".to_owned();

    let simulated_stream = [
        "Updating the date",
        " now.:",
        "::SEAR",
        "CH:::The launch moves to Friday.",
        ":::REPLACE",
        ":::The launch moves",
        " to Monday",
        ", 9am.",
        ":::EN",
        "D:::",
        " Done!",
    ];

    let mut tokenizer = Tokenizer::new(TokenizerOptions::default());
    let mut engine = PatchEngine::new(document, PatchOptions::default());
    let mut console = Console { repaints: 0 };

    for fragment in simulated_stream {
        for event in tokenizer.advance(fragment) {
            engine.apply_with(&event, &mut console);
        }
    }
    for event in tokenizer.finalize() {
        engine.apply_with(&event, &mut console);
    }

    let out = engine.finish();
    println!("final document:\n{}", out.document);
    println!("stats: {:?}", out.stats);
}
