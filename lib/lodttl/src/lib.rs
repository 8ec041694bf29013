//! Streaming parsers and serializers for the Turtle family of RDF
//! concrete syntaxes: N-Triples, N-Quads, Turtle, TriG and N3.
//!
//! All parsers work incrementally: they can be fed input chunk by chunk
//! with any chunk boundaries and emit statements as soon as they are
//! complete. Each format supports the dialects of the syntax that have
//! been in common use, selected with the `with_dialect` builder methods.

mod lexer;
mod line_formats;
pub mod n3;
pub mod nquads;
pub mod ntriples;
mod terse;
pub mod toolkit;
pub mod trig;
pub mod turtle;

pub use crate::n3::N3Parser;
pub use crate::nquads::NQuadsParser;
pub use crate::nquads::NQuadsSerializer;
pub use crate::ntriples::{NTriplesDialect, NTriplesParser, NTriplesSerializer};
pub use crate::toolkit::{ParseError, SyntaxError, TextPosition};
pub use crate::trig::{TriGDialect, TriGParser, TriGSerializer};
pub use crate::turtle::{TurtleDialect, TurtleParser, TurtleSerializer};

pub(crate) const MIN_BUFFER_SIZE: usize = 4096;
pub(crate) const MAX_BUFFER_SIZE: usize = 4096 * 4096;
