#![no_main]

//! Tokenizer robustness fuzzer.
//!
//! The tokenizer must never panic and never reject input: malformed markup
//! degrades to a best-effort token stream.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let _ = markup::tokenize(&input);
});
