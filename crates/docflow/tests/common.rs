#![allow(missing_docs)]
#![expect(clippy::needless_raw_string_hashes)]

/// The document the turn starts from.
pub const DOCUMENT: &str = r#"# Field notes

The quick brown fox jumps over the lazy dog.
It was a bright cold day in April.
"#;

/// A model response cut the way a streaming API cuts it, with most seams
/// placed inside delimiters or right next to them.
pub const STREAM: [&str; 14] = [
    r#"Sure, I'll tighten the "#,                                  // plain prose
    r#"opening line:"#,                                            // trailing ':' is withheld
    r#"::SEARCH:::The quick brown fox "#,                          // opener completed across the seam
    r#"jumps over the lazy dog.:::RE"#,                            // excerpt ends inside ':::REPLACE:::'
    r#"PLACE:::A quick fox"#,                                      // replacement body starts
    r#" vaults the dog."#,                                         // body continues
    r#":::"#,                                                      // could still be ':::END:::'
    r#"END::: And "#,                                              // closer done, prose resumes
    r#"the date: :::SEARCH:::"#,                                   // prose colon, then a new block
    r#"bright cold day in April:::REPLACE:::grey morning"#,        // excerpt without its period
    r#" in May:::END:::"#,                                         // closes the second block
    r#" Finally a note on a missing "#,                            // prose
    r#"line: :::SEARCH:::no such line:::REPLACE:::"#,              // excerpt absent from the document
    r#"ignored:::END:::"#,                                         // body of a missed replace
];

/// What the document reads after the whole response.
pub const EXPECTED_DOCUMENT: &str = r#"# Field notes

A quick fox vaults the dog.
It was a grey morning in May.
"#;
