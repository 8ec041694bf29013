//! Unified parsing and serialization API for the RDF concrete syntaxes.
//!
//! It bundles a format registry ([`RdfFormat`]), quad-level parser and
//! serializer facades dispatching to the per-syntax crates
//! ([`RdfParser`] / [`RdfSerializer`]), push-based statement sinks
//! ([`QuadSink`]) and single-term formatters ([`NTriplesFormatter`],
//! [`TurtleFormatter`], [`SparqlFormatter`]).
//!
//! ```
//! use lodio::{RdfFormat, RdfParser, RdfSerializer};
//!
//! let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .";
//!
//! let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(Vec::new());
//! for quad in RdfParser::from_format(RdfFormat::Turtle).for_slice(file.as_bytes()) {
//!     serializer.serialize_quad(&quad?)?;
//! }
//! assert_eq!(
//!     serializer.finish()?,
//!     b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n"
//! );
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod error;
mod format;
mod formatter;
mod parser;
mod serializer;
mod sink;

pub use crate::error::{
    CapabilityError, RdfParseError, RdfSyntaxError, TextPosition, UnserializableError,
};
pub use crate::format::RdfFormat;
pub use crate::formatter::{NTriplesFormatter, SparqlFormatter, TermPosition, TurtleFormatter};
pub use crate::parser::{RdfParser, ReaderQuadParser, SliceQuadParser};
pub use crate::serializer::{RdfSerializer, WriterQuadSerializer};
pub use crate::sink::{
    parse_to_sink, ChainedSink, CountingSink, DatasetSink, PagingSink, QuadSink, SinkOutcome,
    SinkResult,
};
