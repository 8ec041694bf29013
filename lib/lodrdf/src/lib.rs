//! Term model for RDF 1.1 and RDF-star: IRIs, blank nodes, literals, triples,
//! quads, graph and dataset containers, plus ordered namespace management with
//! prefixed-name expansion and reduction.
//!
//! ```
//! use lodrdf::{Literal, NamedNode, Triple};
//!
//! let triple = Triple::new(
//!     NamedNode::new("http://example.com/s")?,
//!     NamedNode::new("http://example.com/p")?,
//!     Literal::new_simple_literal("o"),
//! );
//! assert_eq!(
//!     triple.to_string(),
//!     "<http://example.com/s> <http://example.com/p> \"o\""
//! );
//! # Result::<_, oxiri::IriParseError>::Ok(())
//! ```

mod blank_node;
mod dataset;
mod graph;
mod literal;
mod named_node;
mod namespaces;
mod parser;
mod triple;
mod variable;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeIdParseError};
pub use crate::dataset::Dataset;
pub use crate::graph::Graph;
pub use crate::literal::Literal;
pub use crate::named_node::NamedNode;
pub use crate::namespaces::{Namespaces, ResolutionError};
pub use crate::parser::TermParseError;
pub use crate::triple::{GraphName, Quad, Subject, Term, Triple};
pub use crate::variable::{Variable, VariableNameParseError};
pub use oxilangtag::LanguageTagParseError;
pub use oxiri::IriParseError;
