//! Streaming parsers and serializers for the
//! [SPARQL query results](https://www.w3.org/TR/sparql11-query/) formats:
//! XML, JSON, CSV and TSV.
//!
//! CSV is a write-only format: it loses the distinction between IRIs, blank
//! nodes and literals, so parsing it back is not supported.
//!
//! ```
//! use lodrdf::{Literal, Variable};
//! use lodresults::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
//!
//! let json_parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
//! // boolean
//! if let QueryResultsReader::Boolean(v) = json_parser.for_reader(br#"{"boolean":true}"#.as_slice())? {
//!     assert_eq!(v, true);
//! }
//! // solutions
//! if let QueryResultsReader::Solutions(solutions) = json_parser.for_reader(br#"{"head":{"vars":["foo","bar"]},"results":{"bindings":[{"foo":{"type":"literal","value":"test"}}]}}"#.as_slice())? {
//!     assert_eq!(
//!         solutions.variables(),
//!         &[Variable::new_unchecked("foo"), Variable::new_unchecked("bar")]
//!     );
//!     for solution in solutions {
//!         assert_eq!(
//!             solution?.iter().collect::<Vec<_>>(),
//!             vec![(
//!                 &Variable::new_unchecked("foo"),
//!                 &Literal::new_simple_literal("test").into()
//!             )]
//!         );
//!     }
//! }
//! # Result::<_, lodresults::QueryResultsParseError>::Ok(())
//! ```

mod csv;
mod error;
mod format;
mod json;
mod parser;
mod serializer;
pub mod solution;
mod xml;

pub use crate::error::{QueryResultsParseError, QueryResultsSyntaxError, TextPosition};
pub use crate::format::QueryResultsFormat;
pub use crate::parser::{QueryResultsParser, QueryResultsReader, SolutionsReader};
pub use crate::serializer::{QueryResultsSerializer, WriterSolutionsSerializer};
pub use crate::solution::QuerySolution;
