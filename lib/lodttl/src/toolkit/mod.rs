//! lodttl parsing toolkit.
//!
//! Provides the basic code to write plain Rust lexers and parsers able to read
//! files chunk by chunk, with token boundaries independent of the chunk sizes.

mod error;
mod parser;
mod tokenizer;

pub use self::error::{ParseError, SyntaxError, TextPosition};
pub use self::parser::{
    GrammarError, GrammarRecognizer, Parser, ReaderIterator, SliceIterator,
};
pub use self::tokenizer::{TokenSource, TokenSourceError, Tokenizer};
